pub mod health;
pub mod prompt;
pub mod run;
pub mod strategies;

use anyhow::anyhow;
use extract_bench::BenchError;

/// Surface a library error with the text a user should see.
pub(crate) fn user_error(e: BenchError) -> anyhow::Error {
    anyhow!(e.user_message())
}
