use {
    anyhow::Result as Anyhow,
    bd2wav::{convert, rates::DEFAULT_RATE},
    camino::Utf8PathBuf as PathBuf,
    clap::Parser,
};

const LONG_ABOUT: &str = "\
Converts the audio clips in a PS2 .bd sound bank to .wav files.

If there is a .hd file with the same name beside the .bd file, the sample rate of each clip \
is taken from it. A .hd file elsewhere can be given as the second argument. If the sample rate \
is already known, give it instead of the .hd file.

Examples:
    bd2wav input.bd
    bd2wav input.bd input.hd
    bd2wav input.bd 22050";

#[derive(Debug, Parser)]
#[command(name = "bd2wav", version, about, long_about = LONG_ABOUT)]
struct Args {
    /// The .bd sound bank to convert
    bd: PathBuf,

    /// The bank's .hd file, or a sample rate to use for every clip
    #[arg(value_name = "HD|RATE")]
    hd_or_rate: Option<String>,

    /// Sample rate for every clip; the .hd file is ignored
    #[arg(short, long)]
    rate: Option<u32>,

    /// Sample rate used when there's no .hd file to go on
    #[arg(long, default_value_t = DEFAULT_RATE)]
    default_rate: u32,

    /// Where to put the .wav files [default: beside the bank, named after it]
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Log more; repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> log::LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => log::LevelFilter::Warn,
            (_, 0)    => log::LevelFilter::Info,
            (_, 1)    => log::LevelFilter::Debug,
            _         => log::LevelFilter::Trace,
        }
    }

    fn into_config(self) -> convert::Config {
        let (hd_path, rate) = match self.hd_or_rate {
            Some(arg) => match arg.parse::<u32>() {
                Ok(rate) => (None, Some(rate)),
                Err(_)   => (Some(PathBuf::from(arg)), None),
            },
            None => (None, None),
        };

        convert::Config {
            bd_path: self.bd,
            hd_path,
            rate: self.rate.or(rate),
            default_rate: self.default_rate,
            out_dir: self.out_dir,
        }
    }
}

fn main() -> Anyhow<()> {
    let args = Args::parse();
    log_init(args.log_level())?;

    let config = args.into_config();
    let summary = convert::run(&config)?;
    log::info!("saved {} wav files to {}", summary.clips, summary.out_dir);
    Ok(())
}

fn log_init(filter: log::LevelFilter) -> Anyhow<()> {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};
    let term = TermLogger::new(
        filter,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    CombinedLogger::init(vec![term])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> convert::Config {
        let args = std::iter::once("bd2wav").chain(args.iter().copied());
        Args::try_parse_from(args).unwrap().into_config()
    }

    #[test]
    fn bank_only() {
        let config = config(&["sound/se.bd"]);
        assert_eq!(config.bd_path, "sound/se.bd");
        assert_eq!(config.hd_path, None);
        assert_eq!(config.rate, None);
        assert_eq!(config.default_rate, 32000);
        assert_eq!(config.out_dir, None);
    }

    #[test]
    fn second_argument_is_header_or_rate() {
        let config_hd = config(&["se.bd", "other/se.hd"]);
        assert_eq!(config_hd.hd_path.as_ref().map(|p| p.as_str()), Some("other/se.hd"));
        assert_eq!(config_hd.rate, None);

        let config_rate = config(&["se.bd", "22050"]);
        assert_eq!(config_rate.hd_path, None);
        assert_eq!(config_rate.rate, Some(22050));
    }

    #[test]
    fn rate_flag_beats_positional() {
        let config = config(&["se.bd", "22050", "--rate", "11025", "--default-rate", "44100"]);
        assert_eq!(config.rate, Some(11025));
        assert_eq!(config.default_rate, 44100);
    }

    #[test]
    fn log_levels() {
        let level = |args: &[&str]| {
            let args = std::iter::once("bd2wav").chain(args.iter().copied());
            Args::try_parse_from(args).unwrap().log_level()
        };
        assert_eq!(level(&["se.bd"]), log::LevelFilter::Info);
        assert_eq!(level(&["se.bd", "-v"]), log::LevelFilter::Debug);
        assert_eq!(level(&["se.bd", "-vv"]), log::LevelFilter::Trace);
        assert_eq!(level(&["se.bd", "-q"]), log::LevelFilter::Warn);
        assert!(Args::try_parse_from(["bd2wav", "se.bd", "-q", "-v"]).is_err());
    }

    #[test]
    fn needs_a_bank() {
        assert!(Args::try_parse_from(["bd2wav"]).is_err());
    }
}
