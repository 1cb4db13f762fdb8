use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};

#[derive(Debug, Clone)]
pub struct OutputFlags {
    pub json: bool,
    pub markdown: bool,
    pub pretty: bool,
}

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub encrypt: Option<bool>,
    pub trust_cert: Option<bool>,
    pub output: OutputFlags,
    pub verbose: u8,
    pub quiet: bool,
    pub command: CommandKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Help { all: bool, command: Option<String> },
    Find(FindArgs),
    Objects(ObjectsArgs),
    Targets(TargetsArgs),
    Status(StatusArgs),
    Init(InitArgs),
    Config(ConfigArgs),
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindArgs {
    pub pattern: String,
    pub table: Option<String>,
    pub schema: Option<String>,
    pub all_databases: bool,
    pub include_system: bool,
    pub max_rows: Option<u64>,
    pub csv: Option<PathBuf>,
    pub show_sql: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectsArgs {
    pub pattern: String,
    pub object_type: Option<String>,
    pub columns: bool,
    pub definitions: bool,
    pub include_system: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetsArgs {
    pub table: Option<String>,
    pub schema: Option<String>,
    pub all_databases: bool,
    pub include_system: bool,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
    pub force: bool,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionsArgs {
    pub shell: Option<String>,
}

pub fn build_cli(show_all: bool) -> Command {
    let mut cmd = Command::new("ssgrep")
        .about("Find a string anywhere in SQL Server: data, names, definitions")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .subcommand_value_name("COMMAND");

    cmd = add_global_args(cmd);

    cmd = cmd.subcommand(command_help());

    cmd = cmd.subcommand(command_find(show_all));
    cmd = cmd.subcommand(command_objects(show_all));
    cmd = cmd.subcommand(command_targets(show_all));
    cmd = cmd.subcommand(command_status(show_all));
    cmd = cmd.subcommand(command_init(show_all));
    cmd = cmd.subcommand(command_config(show_all));

    cmd = cmd.subcommand(command_completions(show_all));

    cmd
}

pub fn parse_args() -> CliArgs {
    let matches = build_cli(false).get_matches();
    parse_matches(&matches)
}

fn add_global_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("config")
            .long("config")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .global(true)
            .help("Path to the config file (skips discovery)"),
    )
    .arg(
        Arg::new("env-file")
            .long("env-file")
            .value_name("PATH")
            .value_hint(ValueHint::FilePath)
            .global(true)
            .help("Env file loaded before resolving config (default: .env)"),
    )
    .arg(
        Arg::new("profile")
            .long("profile")
            .value_name("NAME")
            .global(true)
            .help("Connection profile from the config file"),
    )
    .arg(
        Arg::new("server")
            .long("server")
            .value_name("HOST")
            .global(true)
            .help("Server hostname or address"),
    )
    .arg(
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .value_parser(clap::value_parser!(u16))
            .global(true)
            .help("TCP port (default: 1433)"),
    )
    .arg(
        Arg::new("database")
            .long("database")
            .value_name("NAME")
            .global(true)
            .help("Database to connect to (default: master)"),
    )
    .arg(
        Arg::new("user")
            .long("user")
            .value_name("USER")
            .global(true)
            .help("Login name for SQL authentication"),
    )
    .arg(
        Arg::new("password")
            .long("password")
            .value_name("PASS")
            .global(true)
            .help("Login password (prefer passwordEnv in the config file)"),
    )
    .arg(
        Arg::new("timeout")
            .long("timeout")
            .value_name("MS")
            .value_parser(clap::value_parser!(u64))
            .global(true)
            .help("Connect and login timeout in milliseconds"),
    )
    .arg(
        Arg::new("encrypt")
            .long("encrypt")
            .value_parser(clap::value_parser!(bool))
            .global(true)
            .help("Require an encrypted connection (true/false)"),
    )
    .arg(
        Arg::new("trust-cert")
            .long("trust-cert")
            .value_parser(clap::value_parser!(bool))
            .global(true)
            .help("Accept the server certificate without validation (true/false)"),
    )
    .arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Emit JSON on stdout"),
    )
    .arg(
        Arg::new("markdown")
            .long("markdown")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Render tables as markdown"),
    )
    .arg(
        Arg::new("pretty")
            .long("pretty")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Render tables with box-drawing characters"),
    )
    .arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true)
            .help("Increase log detail (-v info, -vv debug, -vvv trace)"),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Suppress normal output; errors still print"),
    )
}

fn command_help() -> Command {
    Command::new("help")
        .about("Show detailed help for a command")
        .arg(
            Arg::new("all")
                .long("all")
                .action(ArgAction::SetTrue)
                .help("List every command, hidden ones included"),
        )
        .arg(Arg::new("command").value_name("COMMAND"))
}

fn command_core(
    name: &'static str,
    about: &'static str,
    aliases: &'static [&'static str],
    _show_all: bool,
) -> Command {
    let mut cmd = Command::new(name).about(about);
    for alias in aliases {
        cmd = cmd.visible_alias(*alias);
    }
    cmd
}

fn command_advanced(
    name: &'static str,
    about: &'static str,
    aliases: &'static [&'static str],
    show_all: bool,
) -> Command {
    let mut cmd = Command::new(name).about(about);
    for alias in aliases {
        cmd = cmd.visible_alias(*alias);
    }
    if !show_all {
        cmd = cmd.hide(true);
    }
    cmd
}

/// Scope flags shared by `find` and `targets`. `--table` and
/// `--all-databases` are mutually exclusive; `--include-system` only means
/// anything at server scope, so it requires `--all-databases`.
fn scope_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("table")
            .long("table")
            .value_name("[SCHEMA.]NAME")
            .help("Restrict to a single table"),
    )
    .arg(
        Arg::new("schema")
            .long("schema")
            .value_name("NAME")
            .requires("table")
            .help("Schema for --table (default: profile schema, then dbo)"),
    )
    .arg(
        Arg::new("all-databases")
            .long("all-databases")
            .action(ArgAction::SetTrue)
            .conflicts_with("table")
            .help("Widen to every user database on the server"),
    )
    .arg(
        Arg::new("include-system")
            .long("include-system")
            .action(ArgAction::SetTrue)
            .requires("all-databases")
            .help("Also cover system databases (with --all-databases)"),
    )
}

fn command_find(show_all: bool) -> Command {
    let cmd = command_core(
        "find",
        "Search table data for a string",
        &["search"],
        show_all,
    )
    .arg(
        Arg::new("pattern")
            .index(1)
            .value_name("PATTERN")
            .required(true)
            .help(
                "Substring to look for; matched literally, wildcards included. \
                 Case sensitivity follows the database collation.",
            ),
    );
    scope_args(cmd)
        .arg(
            Arg::new("max-rows")
                .long("max-rows")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Cap displayed rows (default 200, max 2000; JSON/CSV carry all)"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .value_name("FILE")
                .value_hint(ValueHint::FilePath)
                .help("Export all matches to a CSV file"),
        )
        .arg(
            Arg::new("show-sql")
                .long("show-sql")
                .action(ArgAction::SetTrue)
                .help("Print the generated statements instead of executing them"),
        )
}

fn command_objects(show_all: bool) -> Command {
    command_core(
        "objects",
        "Search object names in the catalog",
        &["obj"],
        show_all,
    )
    .arg(
        Arg::new("pattern")
            .index(1)
            .value_name("PATTERN")
            .required(true)
            .help("Substring to look for in names; matched literally"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .value_name("TYPE")
            .value_parser(["table", "view", "proc", "function", "trigger"])
            .help("Restrict to one object type"),
    )
    .arg(
        Arg::new("columns")
            .long("columns")
            .action(ArgAction::SetTrue)
            .help("Also match column names"),
    )
    .arg(
        Arg::new("definitions")
            .long("definitions")
            .action(ArgAction::SetTrue)
            .help("Also match view/proc/function bodies"),
    )
    .arg(
        Arg::new("include-system")
            .long("include-system")
            .action(ArgAction::SetTrue)
            .help("Include system objects"),
    )
    .arg(
        Arg::new("limit")
            .long("limit")
            .value_name("N")
            .value_parser(clap::value_parser!(u64))
            .help("Page size (default 50, max 500)"),
    )
    .arg(
        Arg::new("offset")
            .long("offset")
            .value_name("N")
            .value_parser(clap::value_parser!(u64))
            .help("Rows to skip before the page"),
    )
}

fn command_targets(show_all: bool) -> Command {
    let cmd = command_core(
        "targets",
        "List the text columns a search would scan",
        &["columns"],
        show_all,
    );
    scope_args(cmd).arg(
        Arg::new("limit")
            .long("limit")
            .value_name("N")
            .value_parser(clap::value_parser!(u64))
            .help("Cap listed columns (footer still reports the full count)"),
    )
}

fn command_status(show_all: bool) -> Command {
    command_core("status", "Connectivity smoke test", &["ping"], show_all)
}

fn command_init(show_all: bool) -> Command {
    command_core("init", "Write a starter config file", &[], show_all)
        .arg(
            Arg::new("path")
                .long("path")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath)
                .help("Target file or directory (default: ./.ssgrep/config.yaml)"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Replace an existing file"),
        )
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("NAME")
                .help("Name for the generated profile"),
        )
}

fn command_config(show_all: bool) -> Command {
    command_core("config", "Display resolved config", &[], show_all)
}

fn command_completions(show_all: bool) -> Command {
    command_advanced("completions", "Generate shell completions", &[], show_all).arg(
        Arg::new("shell")
            .long("shell")
            .value_name("SHELL")
            .value_parser(["bash", "zsh", "fish", "powershell", "pwsh", "elvish"])
            .help("Shell to emit a completion script for"),
    )
}

fn parse_matches(matches: &ArgMatches) -> CliArgs {
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let env_file = matches.get_one::<String>("env-file").map(PathBuf::from);
    let profile = matches.get_one::<String>("profile").cloned();
    let server = matches.get_one::<String>("server").cloned();
    let port = matches.get_one::<u16>("port").copied();
    let database = matches.get_one::<String>("database").cloned();
    let user = matches.get_one::<String>("user").cloned();
    let password = matches.get_one::<String>("password").cloned();
    let timeout_ms = matches.get_one::<u64>("timeout").copied();
    let encrypt = matches.get_one::<bool>("encrypt").copied();
    let trust_cert = matches.get_one::<bool>("trust-cert").copied();
    let output = OutputFlags {
        json: matches.get_flag("json"),
        markdown: matches.get_flag("markdown"),
        pretty: matches.get_flag("pretty"),
    };
    let verbose = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    let command = match matches.subcommand() {
        Some(("help", sub_m)) => CommandKind::Help {
            all: sub_m.get_flag("all"),
            command: sub_m.get_one::<String>("command").cloned(),
        },
        Some(("find", sub_m)) => CommandKind::Find(FindArgs {
            pattern: sub_m
                .get_one::<String>("pattern")
                .cloned()
                .unwrap_or_default(),
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            all_databases: sub_m.get_flag("all-databases"),
            include_system: sub_m.get_flag("include-system"),
            max_rows: sub_m.get_one::<u64>("max-rows").copied(),
            csv: sub_m.get_one::<String>("csv").map(PathBuf::from),
            show_sql: sub_m.get_flag("show-sql"),
        }),
        Some(("objects", sub_m)) => CommandKind::Objects(ObjectsArgs {
            pattern: sub_m
                .get_one::<String>("pattern")
                .cloned()
                .unwrap_or_default(),
            object_type: sub_m.get_one::<String>("type").cloned(),
            columns: sub_m.get_flag("columns"),
            definitions: sub_m.get_flag("definitions"),
            include_system: sub_m.get_flag("include-system"),
            limit: sub_m.get_one::<u64>("limit").copied(),
            offset: sub_m.get_one::<u64>("offset").copied(),
        }),
        Some(("targets", sub_m)) => CommandKind::Targets(TargetsArgs {
            table: sub_m.get_one::<String>("table").cloned(),
            schema: sub_m.get_one::<String>("schema").cloned(),
            all_databases: sub_m.get_flag("all-databases"),
            include_system: sub_m.get_flag("include-system"),
            limit: sub_m.get_one::<u64>("limit").copied(),
        }),
        Some(("status", _)) => CommandKind::Status(StatusArgs),
        Some(("init", sub_m)) => CommandKind::Init(InitArgs {
            path: sub_m.get_one::<String>("path").map(PathBuf::from),
            force: sub_m.get_flag("force"),
            profile: sub_m.get_one::<String>("profile").cloned(),
        }),
        Some(("config", _)) => CommandKind::Config(ConfigArgs),
        Some(("completions", sub_m)) => CommandKind::Completions(CompletionsArgs {
            shell: sub_m.get_one::<String>("shell").cloned(),
        }),
        _ => CommandKind::Help {
            all: false,
            command: None,
        },
    };

    CliArgs {
        config_path,
        env_file,
        profile,
        server,
        port,
        database,
        user,
        password,
        timeout_ms,
        encrypt,
        trust_cert,
        output,
        verbose,
        quiet,
        command,
    }
}
