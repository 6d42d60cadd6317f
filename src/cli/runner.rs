//! Runner that wires configuration, input, the registry client and reports

use crate::cli::args::{Args, Command};
use crate::config::AppConfig;
use crate::error::{CheckerError, Result};
use crate::input::read_identifiers;
use crate::logging::Logger;
use crate::output::ReportWriter;
use crate::profile::summarize_all;
use crate::record::{INSCRIPTION_ERROR_KEYS, accumulate_errors, without_keys};
use crate::registry::{RegistryClient, RegistryClientBuilder};
use crate::types::{Identifier, RecordMap};

pub struct Runner {
    args: Args,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Result<Self> {
        let output = if args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };
        let output = match &args.log_file {
            Some(path) => output.with_log_file(path)?,
            None => output,
        };

        Ok(Self { args, output })
    }

    pub fn output(&self) -> &Logger {
        &self.output
    }

    /// Load the environment and run the selected command
    pub async fn run(&self) -> Result<()> {
        self.output.section("NIT Checker");

        AppConfig::load_env_file(self.args.env_file.as_deref())?;
        let config = AppConfig::from_env()?;
        self.run_with_config(&config).await
    }

    /// Run the selected command against an already loaded config
    pub async fn run_with_config(&self, config: &AppConfig) -> Result<()> {
        self.output.verbose(&format!("Registry: {}", config.base_url));

        match &self.args.command {
            Command::Errors => self.run_errors(config).await?,
            Command::Monotributo => self.run_monotributo(config).await?,
            Command::Health { name } => {
                let service = name.as_deref().unwrap_or(&self.args.service);
                self.run_health(config, service).await?
            }
        }

        self.output.success(&format!(
            "Process completed in {}",
            self.output.format_duration(self.output.elapsed())
        ));
        Ok(())
    }

    fn load_identifiers(&self, config: &AppConfig) -> Result<Vec<Identifier>> {
        let path = self
            .args
            .input
            .as_ref()
            .or(config.input_path.as_ref())
            .ok_or_else(|| {
                CheckerError::Config("EXCEL_FILE_PATH is not set and no --input given".to_string())
            })?;

        let identifiers = read_identifiers(path, &self.args.column)?;
        self.output
            .info(&format!("Total NITs to consult: {}", identifiers.len()));
        Ok(identifiers)
    }

    async fn connect(&self, config: &AppConfig) -> Result<RegistryClient> {
        self.output.step("Connecting to the registry");
        let client = RegistryClientBuilder::from_config(config)
            .with_logger(self.output.clone())
            .build()
            .await?;
        self.output
            .verbose(&format!("Client ready for {}", client.base_url()));
        Ok(client)
    }

    /// Fetch the configured service; an unavailable service yields no records
    async fn fetch(&self, client: &RegistryClient, identifiers: &[Identifier]) -> RecordMap {
        match client.fetch_batched(&self.args.service, identifiers).await {
            Ok(records) => {
                self.output
                    .info(&format!("Data fetched: {} records", records.len()));
                records
            }
            Err(e) => {
                self.output.error(&format!("Fetch aborted: {}", e));
                RecordMap::new()
            }
        }
    }

    async fn run_errors(&self, config: &AppConfig) -> Result<()> {
        let identifiers = self.load_identifiers(config)?;
        let client = self.connect(config).await?;
        let fetched = self.fetch(&client, &identifiers).await;

        let errors = accumulate_errors(&fetched, &INSCRIPTION_ERROR_KEYS);
        self.output
            .info(&format!("Records with errors: {}", errors.len()));
        let success = without_keys(&fetched, &errors);

        let writer = ReportWriter::new(&self.args.output_dir, self.output.clone());
        let written = [
            writer.write(identifiers.len(), "errors", &errors),
            writer.write(identifiers.len(), "success", &success),
        ];

        self.output.summary_kv(
            "Summary",
            &[
                ("Identifiers", identifiers.len().to_string()),
                ("Records fetched", fetched.len().to_string()),
                ("With errors", errors.len().to_string()),
                ("Without errors", success.len().to_string()),
            ],
        );

        for result in written {
            result?;
        }
        Ok(())
    }

    async fn run_monotributo(&self, config: &AppConfig) -> Result<()> {
        let identifiers = self.load_identifiers(config)?;
        let client = self.connect(config).await?;
        let fetched = self.fetch(&client, &identifiers).await;

        let errors = accumulate_errors(&fetched, &INSCRIPTION_ERROR_KEYS);
        self.output
            .info(&format!("Records with errors: {}", errors.len()));
        let summaries = summarize_all(&without_keys(&fetched, &errors));

        let writer = ReportWriter::new(&self.args.output_dir, self.output.clone());
        writer.write(identifiers.len(), "personas_con_info", &summaries)?;

        self.output.summary_kv(
            "Summary",
            &[
                ("Identifiers", identifiers.len().to_string()),
                ("Records fetched", fetched.len().to_string()),
                ("With regime data", summaries.len().to_string()),
            ],
        );
        Ok(())
    }

    async fn run_health(&self, config: &AppConfig, service: &str) -> Result<()> {
        let client = self.connect(config).await?;
        let health = client.check_health(service).await?;

        if health.is_healthy() {
            self.output
                .success(&format!("Service '{}' is healthy ({})", service, health.status));
        } else {
            self.output.warning(&format!(
                "Service '{}' answered with status {}",
                service, health.status
            ));
        }
        self.output.summary_kv(
            "Health",
            &[("Status", health.status.to_string()), ("Body", health.body)],
        );
        Ok(())
    }
}
