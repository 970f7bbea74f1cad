use crate::cli::ConfigArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use tabled::Tabled;

pub fn execute(args: ConfigArgs, output: &OutputWriter) -> Result<()> {
    let layered = load_config(args.config.as_deref())?;

    // Surface validation problems without refusing to show the values
    if let Err(e) = layered.to_pipeline_config() {
        output.warning(e);
    }

    let inspection_map = layered.to_inspection_map();

    if output.is_json() {
        let values = inspection_map
            .into_iter()
            .map(|(key, (value, source))| ConfigEntry { key, value, source: source.to_string() })
            .collect();
        return output.result(ConfigOutput { values });
    }

    output.section("Configuration Values");

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
        .map(|(key, (value, source))| ConfigRow { key, value, source: source.to_string() })
        .collect();

    output.table(rows);

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");

    Ok(())
}
