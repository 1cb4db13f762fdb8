mod args;

pub use args::{
    CliArgs, CommandKind, CompletionsArgs, ConfigArgs, FindArgs, InitArgs, ObjectsArgs,
    OutputFlags, StatusArgs, TargetsArgs, build_cli,
};

pub fn parse() -> CliArgs {
    args::parse_args()
}
