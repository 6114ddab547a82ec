use clap::Parser;
use fort::cli::commands::add::AddArgs;
use fort::cli::commands::edit::EditArgs;
use fort::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log to stderr. `FORT_LOG` wins over the `-v` count.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("FORT_LOG").unwrap_or_else(|_| EnvFilter::new(format!("fort={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => fort::cli::commands::init::execute(&cli),
        Commands::Status => fort::cli::commands::status::execute(&cli),
        Commands::Add {
            ref title,
            ref username,
            ref url,
            ref notes,
            favorite,
        } => fort::cli::commands::add::execute(
            &cli,
            AddArgs {
                title,
                username,
                url,
                notes,
                favorite,
            },
        ),
        Commands::List { ref search } => fort::cli::commands::list::execute(&cli, search.as_deref()),
        Commands::Show { ref title, reveal } => {
            fort::cli::commands::show::execute(&cli, title, reveal)
        }
        Commands::Copy { ref title, field } => {
            fort::cli::commands::copy::execute(&cli, title, field)
        }
        Commands::Edit {
            ref title,
            ref new_title,
            ref username,
            ref url,
            ref notes,
            password,
        } => fort::cli::commands::edit::execute(
            &cli,
            title,
            EditArgs {
                new_title: new_title.as_deref(),
                username: username.as_deref(),
                url: url.as_deref(),
                notes: notes.as_deref(),
                password,
            },
        ),
        Commands::Favorite { ref title } => fort::cli::commands::favorite::execute(&cli, title),
        Commands::Remove { ref title, force } => {
            fort::cli::commands::remove::execute(&cli, title, force)
        }
        Commands::Lock => fort::cli::commands::lock::execute_lock(&cli),
        Commands::Unlock => fort::cli::commands::lock::execute_unlock(&cli),
        Commands::Passwd => fort::cli::commands::passwd::execute(&cli),
        Commands::Export {
            ref format,
            ref output,
            ref title,
        } => fort::cli::commands::export::execute(
            &cli,
            format,
            output.as_deref(),
            title.as_deref(),
        ),
        Commands::Config { ref key, ref value } => {
            fort::cli::commands::config_cmd::execute(&cli, key.as_deref(), value.as_deref())
        }
        Commands::Session => fort::cli::commands::session::execute(&cli),
    };

    if let Err(e) = result {
        fort::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
