//! Command-line configuration for the simulator.
//!
//! Usage: simulator [OPTIONS] [VPN[w] ...]
//!
//! Options:
//!   -p, --policy <name>  clock, fifo or random (default: fifo)
//!   -f, --frames <n>     RAM frames given to the process (default: 3)
//!   -n, --pages <n>      size of the virtual address space in pages
//!                        (default: 256, at most 65536)
//!   -s, --seed <n>       seed for the random policy
//!   -v, --verbose        print every access
//!   -h, --help           print help
//!
//! Each positional argument is one access. A trailing `w` makes it a write,
//! so `3w` writes page 3. Without positionals the classic Belady reference
//! string is used. Pages must lie below `--pages`, and a process cannot have
//! more frames than pages.

use vm::operating_system::ReplacementPolicy;

pub const DEFAULT_FRAMES: usize = 3;

/// 8-bit page numbers.
pub const DEFAULT_PAGES: usize = 256;

/// 16-bit page numbers.
pub const MAX_PAGES: usize = 1 << 16;

/// Reference string from Belady's anomaly: 9 faults with 3 FIFO frames,
/// 10 with 4.
pub const BELADY_REFERENCES: [usize; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Access {
    pub vpn: usize,
    pub write: bool,
}

impl Access {
    pub fn read(vpn: usize) -> Self {
        Access { vpn, write: false }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Config {
    pub policy: ReplacementPolicy,
    pub frames: usize,
    pub pages: usize,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub references: Vec<Access>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

pub fn print_help(program: &str) {
    eprintln!("Page replacement simulator - runs a reference string against one process");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] [VPN[w] ...]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p, --policy <name>  clock, fifo or random (default: fifo)");
    eprintln!("  -f, --frames <n>     RAM frames for the process (default: {})", DEFAULT_FRAMES);
    eprintln!(
        "  -n, --pages <n>      virtual pages of the process (default: {}, max: {})",
        DEFAULT_PAGES, MAX_PAGES
    );
    eprintln!("  -s, --seed <n>       seed for the random policy");
    eprintln!("  -v, --verbose        print every access");
    eprintln!("  -h, --help           print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --policy clock --frames 4", program);
    eprintln!("  {} -p random -s 42 0 1 2w 0 3 1w", program);
}

/// Parses the arguments that follow the program name.
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut policy = ReplacementPolicy::Fifo;
    let mut frames = DEFAULT_FRAMES;
    let mut pages = DEFAULT_PAGES;
    let mut seed = None;
    let mut verbose = false;
    let mut references = Vec::new();

    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--verbose" => verbose = true,
            "-p" | "--policy" => {
                policy = ReplacementPolicy::from_name(option_value(arg, args.next())?);
            }
            "-f" | "--frames" => {
                frames = parse_number(arg, option_value(arg, args.next())?)?;
            }
            "-n" | "--pages" => {
                pages = parse_number(arg, option_value(arg, args.next())?)?;
            }
            "-s" | "--seed" => {
                seed = Some(parse_number(arg, option_value(arg, args.next())?)?);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}\nUse --help for usage information.", arg));
            }
            _ => references.push(parse_access(arg)?),
        }
    }

    if pages == 0 || pages > MAX_PAGES {
        return Err(format!("Page count must be between 1 and {}, got {}", MAX_PAGES, pages));
    }

    if frames == 0 {
        return Err("A process needs at least one frame".to_string());
    }

    if frames > pages {
        return Err(format!("Cannot give {} frames to a process with {} pages", frames, pages));
    }

    if references.is_empty() {
        references = BELADY_REFERENCES.iter().map(|&vpn| Access::read(vpn)).collect();
    }

    if let Some(access) = references.iter().find(|access| access.vpn >= pages) {
        return Err(format!(
            "Page {} is outside the address space of {} pages",
            access.vpn, pages
        ));
    }

    Ok(Command::Run(Config {
        policy,
        frames,
        pages,
        seed,
        verbose,
        references,
    }))
}

fn option_value<'a>(option: &str, value: Option<&'a String>) -> Result<&'a str, String> {
    value
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", option))
}

fn parse_number<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", option, value))
}

fn parse_access(arg: &str) -> Result<Access, String> {
    let (digits, write) = match arg.strip_suffix('w').or_else(|| arg.strip_suffix('W')) {
        Some(digits) => (digits, true),
        None => (arg, false),
    };

    let vpn = digits
        .parse()
        .map_err(|_| format!("Invalid page reference: {}", arg))?;

    Ok(Access { vpn, write })
}
