mod response;

pub use response::{print_result, CliResponse};
