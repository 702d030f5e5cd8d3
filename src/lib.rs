// Library root
// -----------
// This crate exposes a small library surface for the `crawlio` CLI. The
// binary (`main.rs`) parses arguments and hands over to the flows in `ui`.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the Crawlio API (register, crawl,
//   history) holding the API key between calls.
// - `report`: text previews, printed summaries and the saved JSON file.
// - `ui`: the demo / crawl / history flows, spinner, password prompt and
//   the saved API key file.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod logging;
pub mod report;
pub mod ui;
