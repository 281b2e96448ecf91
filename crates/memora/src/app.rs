use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("memora")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Capture the URL of the browser tab you are looking at")
        .long_about(
            "memora finds the foreground browser window and copies the URL out of its \
             address bar, restoring your clipboard and focus afterwards. `memora serve` \
             runs the quick capture window controller for the desktop shell over JSON Lines.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("detect")
                .about("Detect the active browser window")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("capture")
                .about("Capture the URL of the active browser tab")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .help("Overall capture timeout in milliseconds (overrides config)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the quick window controller over JSON Lines on stdin/stdout"),
        )
}
