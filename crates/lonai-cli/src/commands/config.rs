use lonai_core::Config;

use crate::output;

pub fn run(config: &Config) {
    output::header("Current Configuration");

    let entries = config.redacted();
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in entries {
        println!("{key:<width$}  {value}");
    }
}
