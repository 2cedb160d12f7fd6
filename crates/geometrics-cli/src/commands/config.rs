//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::{config_file_in_use, load_config};
use crate::output::OutputWriter;
use crate::output_types::{ConfigOutput, ConfigValue};
use anyhow::Result;
use tabled::Tabled;

pub fn execute(args: ConfigArgs, output: &OutputWriter) -> Result<()> {
    let layered = load_config(args.config.as_deref())?;
    let config_file = config_file_in_use(args.config.as_deref());

    // Range checks happen at resolve time; show the values either way
    let error = layered.resolve().err().map(|e| e.to_string());
    let inspection_map = layered.to_inspection_map();

    if output.is_json() {
        let values = inspection_map
            .into_iter()
            .map(|(key, (value, source))| {
                (key, ConfigValue { value, source: format!("{:?}", source) })
            })
            .collect();
        return output.result(ConfigOutput { config_file, values, error });
    }

    output.section("Configuration");
    output.kv("Config file", config_file.as_deref().unwrap_or("(none)"));

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();
    output.table(rows);

    if let Some(error) = error {
        output.warning(error);
    }

    Ok(())
}
