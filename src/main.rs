use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use screen_unlock::{Adb, Controller, ThreadSleep, UnlockOptions};
use tracing_subscriber::EnvFilter;

/// Wake and unlock an Android device if its screen is locked.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Serial of the target device, as listed by `adb devices`.
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    serial: String,
}

fn main() {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| "screen_unlock=info".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Anything but a single serial exits with status 2 and a usage message.
    let cli = Cli::parse();
    let options = UnlockOptions::default();

    let mut controller = Controller::new(Adb::new(&options), ThreadSleep, &options);
    let outcome = controller.run(&cli.serial);
    println!("{}: {outcome}", cli.serial);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_exactly_one_serial() {
        assert!(Cli::try_parse_from(["screen-unlock"]).is_err());
        assert!(Cli::try_parse_from(["screen-unlock", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["screen-unlock", ""]).is_err());

        let cli = Cli::try_parse_from(["screen-unlock", "emulator-5554"]).unwrap();
        assert_eq!(cli.serial, "emulator-5554");
    }

    #[test]
    fn flags_are_not_accepted() {
        for args in [
            vec!["screen-unlock", "--settle-ms", "0", "R58M123"],
            vec!["screen-unlock", "--adb", "/opt/adb", "R58M123"],
            vec!["screen-unlock", "R58M123", "--verbose"],
        ] {
            let err = Cli::try_parse_from(args.iter().copied()).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{args:?}");
        }
    }

    #[test]
    fn help_and_version_are_usage_errors() {
        for flag in ["--help", "-h", "--version", "-V"] {
            let err = Cli::try_parse_from(["screen-unlock", flag]).unwrap_err();
            assert_ne!(err.exit_code(), 0, "{flag}");
        }
    }

    #[test]
    fn usage_error_exit_status() {
        let err = Cli::try_parse_from(["screen-unlock"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
