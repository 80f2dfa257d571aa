use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use folio::content::{Experience, Post, Project, read_time_label, read_time_minutes};
use folio::store::{Library, Snapshot};
use folio::{Config, blocks_to_html, parse};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Render portfolio and blog content")]
struct Cli {
    /// Config file (defaults to the bundled settings when missing)
    #[arg(short, long, global = true, default_value = "folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a content file as HTML
    Render {
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump the parsed blocks of a content file as JSON
    Blocks { input: PathBuf },
    /// Estimate reading time of a content file
    ReadTime { input: PathBuf },
    /// List published posts from a content snapshot
    Posts {
        snapshot: PathBuf,

        #[arg(short, long)]
        limit: Option<usize>,

        /// Use the shorter "latest posts" listing size
        #[arg(long)]
        latest: bool,
    },
    /// Render one published post from a content snapshot
    Post { snapshot: PathBuf, slug: String },
    /// List projects from a content snapshot
    Projects {
        snapshot: PathBuf,

        #[arg(long, value_enum, default_value_t = ProjectFilter::Published)]
        filter: ProjectFilter,
    },
    /// Render one project from a content snapshot
    Project {
        snapshot: PathBuf,
        /// Slug of a published project, or a document id with --id
        key: String,

        /// Look the project up by document id, published or not
        #[arg(long)]
        id: bool,
    },
    /// List work history from a content snapshot
    Experiences { snapshot: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProjectFilter {
    All,
    Published,
    Featured,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    info!("using config from {}", cli.config.display());

    match cli.command {
        Command::Render { input, output } => {
            let html = blocks_to_html(&parse(&read_input(&input)?), &config);
            match output {
                Some(output) => {
                    fs::write(&output, html)
                        .with_context(|| format!("Error writing {}", output.display()))?;
                    println!("Created {}", output.display());
                }
                None => print!("{html}"),
            }
        }
        Command::Blocks { input } => {
            let blocks = parse(&read_input(&input)?);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::ReadTime { input } => {
            let minutes = read_time_minutes(&read_input(&input)?, config.reading.words_per_minute);
            println!("{}", read_time_label(minutes));
        }
        Command::Posts {
            snapshot,
            limit,
            latest,
        } => {
            let library = open_library(&snapshot)?;
            let default_limit = if latest {
                config.listing.latest_posts
            } else {
                config.listing.all_posts
            };
            let limit = limit.unwrap_or(default_limit);
            for post in library.published_posts(limit)? {
                print_post_line(&post, &config);
            }
        }
        Command::Post { snapshot, slug } => {
            let library = open_library(&snapshot)?;
            let Some(post) = library.post_by_slug(&slug)? else {
                bail!("No published post with slug {slug}");
            };
            println!("<h1>{}</h1>", html_escape::encode_text(&post.title));
            print!("{}", blocks_to_html(&post.blocks(), &config));
        }
        Command::Projects { snapshot, filter } => {
            let library = open_library(&snapshot)?;
            let projects = match filter {
                ProjectFilter::All => library.all_projects()?,
                ProjectFilter::Published => library.published_projects()?,
                ProjectFilter::Featured => library.featured_projects()?,
            };
            for project in projects {
                print_project_line(&project);
            }
        }
        Command::Project { snapshot, key, id } => {
            let library = open_library(&snapshot)?;
            let project = if id {
                library.project_by_id(&key)?
            } else {
                library.project_by_slug(&key)?
            };
            let Some(project) = project else {
                bail!("No project found for {key}");
            };
            println!("<h1>{}</h1>", html_escape::encode_text(&project.title));
            print!("{}", blocks_to_html(&project.blocks(), &config));
        }
        Command::Experiences { snapshot } => {
            let library = open_library(&snapshot)?;
            for experience in library.all_experiences()? {
                print_experience_line(&experience);
            }
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Error reading {}", path.display()))
}

fn open_library(path: &Path) -> Result<Library<Snapshot>> {
    let snapshot = Snapshot::load(path)?;
    Ok(Library::new(snapshot))
}

fn print_post_line(post: &Post, config: &Config) {
    let date = post.published_at.as_deref().unwrap_or("unpublished");
    let minutes = post.read_time_minutes(config.reading.words_per_minute);
    println!(
        "{}\t{}\t{}\t{}\t{}",
        date,
        post.slug,
        post.category,
        read_time_label(minutes),
        post.title
    );
}

fn print_project_line(project: &Project) {
    let technologies = project
        .technologies
        .iter()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}\t{:?}\t{}\t{}",
        project.slug, project.status, project.title, technologies
    );
}

fn print_experience_line(experience: &Experience) {
    let marker = if experience.is_ongoing() { "*" } else { " " };
    println!(
        "{}{}\t{}\t{}\t{}",
        marker,
        experience.date_range(),
        experience.position,
        experience.company,
        experience.location
    );
}
