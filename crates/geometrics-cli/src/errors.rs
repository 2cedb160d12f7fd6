use console::style;
use geometrics_core::GeometricsError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(ref context) => write!(f, "{}: {}", self.message, context.replace('\n', " ")),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing input file
pub fn input_not_found(path: &Path) -> CliError {
    CliError::new("Input file not found")
        .with_context(format!("Path: {}", path.display()))
        .with_suggestion("Check the file path and try again")
        .with_suggestion("Use an absolute path or a path relative to the current directory")
        .with_help("Run: geometrics evaluate --help")
}

/// Create error for an input file that does not parse
pub fn invalid_input(path: &Path, reason: &str) -> CliError {
    CliError::new("Input file is not valid")
        .with_context(format!("Path: {}\nReason: {}", path.display(), reason))
        .with_suggestion(
            "Expected {\"units\": [{\"id\": ..., \"references\": [...], \"candidates\": [...]}]}",
        )
        .with_suggestion("Geometries use GeoJSON objects: {\"type\": \"Polygon\", \"coordinates\": ...}")
        .with_help("Run: geometrics validate --help")
}

/// Create error for a missing configuration file
pub fn config_file_not_found(path: &Path) -> CliError {
    CliError::new("Configuration file not found")
        .with_context(format!("Path: {}", path.display()))
        .with_suggestion("Check the --config path")
        .with_suggestion("Or omit --config to use ./geometrics.toml when present")
        .with_help("Run: geometrics config --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Reason: {}", reason))
        .with_suggestion("Check command-line flags and GEOMETRICS_* environment variables")
        .with_suggestion("Check geometrics.toml for invalid values")
        .with_help("Run: geometrics config")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    // Configuration errors get dedicated remediation hints
    for cause in error.chain() {
        if let Some(GeometricsError::Configuration { key, reason }) =
            cause.downcast_ref::<GeometricsError>()
        {
            return invalid_config(key, reason);
        }
    }

    let message = format!("{:#}", error);
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.to_lowercase().contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}
