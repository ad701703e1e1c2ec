use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use monobump::analyzer::VersionAnalyzer;
use monobump::cli::orchestration::{
    self, ChangelogWorkflowArgs, ComponentReport, TagWorkflowArgs,
};
use monobump::config::{self, Config};
use monobump::document::DocumentPath;
use monobump::git::Git2Repository;
use monobump::monorepo::MonorepoProcessor;
use monobump::{logging, ui};

#[derive(Parser)]
#[command(
    name = "monobump",
    version,
    about = "Compute and write per-component semantic versions from conventional commits"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short = 'C',
        long = "directory",
        global = true,
        help = "Run as if started in this directory"
    )]
    directory: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Override monorepo.versioning-file (glob relative to the repository root)"
    )]
    versioning_file: Option<String>,

    #[arg(long, global = true, help = "Override monorepo.path (version key expression)")]
    path: Option<String>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered components and their current versions
    Components,
    /// Print each component's next version without writing
    NextVersion,
    /// Write bumped versions into versioning documents
    UpdateVersion {
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },
    /// Write bumped versions, then tag each component's version
    Tag {
        #[arg(long, help = "Push created tags to the configured remote")]
        push: bool,

        #[arg(long, help = "Remote to push to (overrides tag.remote)")]
        remote: Option<String>,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },
    /// List each component's tags, oldest first
    ComponentTags,
    /// Write CHANGELOG.md for each component from its tags
    Changelog {
        #[arg(
            short,
            long,
            default_value_t = 10,
            help = "Number of most recent tags to include"
        )]
        size: usize,

        #[arg(short, long, help = "Include all tags, ignoring --size")]
        all: bool,

        #[arg(long, help = "Add a section for the unreleased next version")]
        add_next_version: bool,

        #[arg(long, help = "Skip tags that are not semantic versions")]
        semantic_version_only: bool,
    },
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Some(dir) = &args.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change directory to {}", dir.display()))?;
    }

    let mut config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    apply_overrides(&mut config, &args);

    let pattern = config.monorepo.versioning_file()?.to_string();
    let version_path = DocumentPath::parse(&config.monorepo.path)?;

    let repo = Git2Repository::open(".").context("Git repository error")?;
    let repo_root = repo
        .workdir()
        .context("Git repository error")?
        .to_path_buf();

    let processor = MonorepoProcessor::new(
        &repo,
        repo_root,
        version_path,
        VersionAnalyzer::new(config.versioning.clone()),
    );

    let (reports, remote): (Vec<ComponentReport>, Option<String>) = match args.command {
        Command::Components => (orchestration::list_components(&processor, &pattern)?, None),
        Command::NextVersion => (orchestration::next_version(&processor, &pattern)?, None),
        Command::UpdateVersion { dry_run } => (
            orchestration::update_version(&processor, &pattern, dry_run)?,
            None,
        ),
        Command::Tag {
            push,
            remote,
            dry_run,
        } => {
            let tag_args = TagWorkflowArgs {
                push: push || config.tag.push,
                remote: remote.unwrap_or_else(|| config.tag.remote.clone()),
                dry_run,
            };
            let reports = orchestration::tag(&processor, &pattern, &tag_args)?;
            (reports, Some(tag_args.remote))
        }
        Command::ComponentTags => (orchestration::component_tags(&processor, &pattern)?, None),
        Command::Changelog {
            size,
            all,
            add_next_version,
            semantic_version_only,
        } => {
            let changelog_args = ChangelogWorkflowArgs {
                size,
                all,
                add_next_version,
                semantic_version_only,
            };
            (
                orchestration::changelog(&processor, &pattern, &changelog_args)?,
                None,
            )
        }
    };

    ui::display_reports(&reports, remote.as_deref());
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(glob) = &args.versioning_file {
        config.monorepo.versioning_file = Some(glob.clone());
    }
    if let Some(path) = &args.path {
        config.monorepo.path = path.clone();
    }
}
