use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::{Config, DATA_DIR_ENV, WORKOUT_NAME_ENV};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a configuration file with the default settings
    Init,
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        match &config.config_file {
                            Some(path) => println!("Config file: {}", path.display()),
                            None => println!(
                                "Config file: {} (not found)",
                                config_path
                                    .unwrap_or_else(Config::default_config_path)
                                    .display()
                            ),
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("workout_name: {}", config.workout_name.value);
                        println!("  source: {}", config.workout_name.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'ironlog config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(default_config_template().as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

fn default_config_template() -> String {
    format!(
        r#"# ironlog configuration

# Directory for workout data (default: {data_dir})
# Relative paths are resolved against this file's directory.
# Overridden by {data_env}.
# data_dir: {data_dir}

# Name given to new workouts started without --name.
# Overridden by {name_env}.
workout_name: Workout
"#,
        data_dir = Config::default_data_dir().display(),
        data_env = DATA_DIR_ENV,
        name_env = WORKOUT_NAME_ENV,
    )
}
