//! The `switchctl` entrypoint: parse a startup command line and show the
//! resulting switches and arguments.

mod cli;
mod config;
mod output;

fn main() {
    switchctl_utils::run_main(cli::run)
}
