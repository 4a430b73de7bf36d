use std::path::Path;

use anyhow::Result;
use clap::Parser;

use gitlab_changelog::cli::orchestration::{run_changelog, write_changelog, GenerateArgs};
use gitlab_changelog::config;
use gitlab_changelog::gitlab::GitLabClient;
use gitlab_changelog::logging;
use gitlab_changelog::ui;

#[derive(clap::Parser)]
#[command(
    name = "gitlab-changelog",
    version,
    about = "Generate a changelog from merged GitLab merge requests, grouped by release tag"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "GitLab instance URL")]
    host: Option<String>,

    #[arg(short, long, help = "Group (namespace) that owns the project")]
    group: Option<String>,

    #[arg(short, long, help = "Project name")]
    project: Option<String>,

    #[arg(long, help = "Private access token (defaults to GITLAB_PRIVATE_TOKEN)")]
    token: Option<String>,

    #[arg(long, help = "Changelog start, e.g. 2020-01-01T00:00:00.000Z")]
    since: Option<String>,

    #[arg(short, long, help = "Output file (default CHANGELOG.md)")]
    output: Option<String>,

    #[arg(short, long, help = "Overwrite the output file without asking")]
    force: bool,

    #[arg(long, help = "Print the changelog to stdout instead of writing it")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

impl Args {
    fn generate_args(&self) -> GenerateArgs {
        GenerateArgs {
            config_path: self.config.clone(),
            host: self.host.clone(),
            group: self.group.clone(),
            project: self.project.clone(),
            token: self.token.clone(),
            since: self.since.clone(),
            output: self.output.clone(),
            force: self.force,
            dry_run: self.dry_run,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(args.verbose);
    let generate = args.generate_args();

    // Load configuration
    let mut config = match config::load_config(generate.config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    generate.apply_to(&mut config);

    if let Err(e) = config.validate() {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }

    let client = match GitLabClient::new(
        &config.gitlab.host,
        config.gitlab.private_token.as_deref(),
    ) {
        Ok(client) => client,
        Err(e) => {
            ui::display_error(&format!("Could not create GitLab client: {}", e));
            std::process::exit(1);
        }
    };

    if !generate.dry_run {
        ui::display_status(&format!(
            "Fetching tags and merge requests from {}",
            config.gitlab.host
        ));
    }

    let report = match run_changelog(&client, &config) {
        Ok(report) => report,
        Err(e) => {
            ui::display_error(&format!("Failed to generate changelog: {}", e));
            std::process::exit(1);
        }
    };

    for warning in &report.warnings {
        ui::display_warning(warning);
    }

    if generate.dry_run {
        print!("{}", report.document);
        return Ok(());
    }

    let output = Path::new(&config.changelog.output);
    if output.exists()
        && !generate.force
        && !ui::confirm_action(&format!("{} already exists. Overwrite?", output.display()))?
    {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    if let Err(e) = write_changelog(output, &report.document) {
        ui::display_error(&format!(
            "Failed to write '{}': {}",
            output.display(),
            e
        ));
        std::process::exit(1);
    }

    ui::display_summary(&report, &config.changelog.output);
    Ok(())
}
