use fsleyes_preset::{FileReport, Invocation, Outcome, PresetSource, Resolution};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(source: &PresetSource, resolution: &Resolution, invocation: &Invocation, color: bool) {
    let palette = ansi::Palette::new(color);
    println!(
        "\n{}",
        palette.bold(palette.paint(format!("⚙  Preset: {source} ({:?} partition)", resolution.mode), ansi::CYAN))
    );

    println!("\n{}", palette.paint("━━━ Files ━━━", ansi::GRAY));
    if resolution.files.is_empty() {
        println!("{}", palette.dim("  No input files"));
    }
    for (idx, report) in resolution.files.iter().enumerate() {
        print_file(idx, report, &palette);
    }

    println!("\n{}", palette.paint("━━━ Partition ━━━", ansi::GRAY));
    println!(
        "  {} {}  │  {} {}",
        palette.dim("matched:"),
        palette.paint(resolution.partition.matched.len().to_string(), ansi::GREEN),
        palette.dim("unmatched:"),
        palette.paint(resolution.partition.unmatched.len().to_string(), ansi::YELLOW),
    );

    // Files that were accepted but landed in neither group were hidden by
    // substring containment.
    let hidden: Vec<_> = resolution
        .files
        .iter()
        .filter(|r| r.outcome == Outcome::NoDirective)
        .filter(|r| !resolution.partition.unmatched.contains(&r.input))
        .collect();
    for report in hidden {
        println!(
            "  {} {}",
            palette.paint("hidden:", ansi::RED),
            palette.paint(format!("{} (name occurs inside a matched entry)", report.input), ansi::YELLOW)
        );
    }

    println!("\n{}", palette.paint("━━━ Command ━━━", ansi::GRAY));
    println!("  {}", palette.bold(invocation.to_string()));

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!("  Total: {}", palette.paint(format!("{:?}", resolution.elapsed), ansi::GREEN));
    println!();
}

fn print_file(idx: usize, report: &FileReport, palette: &ansi::Palette) {
    let index = palette.paint(format!("[{idx}]"), ansi::GRAY);
    match &report.outcome {
        Outcome::Directive(directive) => {
            println!("  {} {} {}", index, palette.bold(palette.paint(&report.input, ansi::GREEN)), palette.dim("│ matched"));
            for fragment in directive.fragments() {
                println!(
                    "      {}  {} {}",
                    palette.paint(fragment.to_string(), ansi::BLUE),
                    palette.dim("│ rule:"),
                    palette.paint(&fragment.rule, ansi::CYAN)
                );
            }
        }
        Outcome::NoDirective => {
            println!("  {} {} {}", index, palette.paint(&report.input, ansi::YELLOW), palette.dim("│ no rule matched"));
        }
        Outcome::Skipped(reason) => {
            println!("  {} {} {}", index, palette.dim(&report.input), palette.paint(format!("│ skipped: {reason}"), ansi::RED));
        }
        Outcome::Template(path) => {
            println!(
                "  {} {} {} {}",
                index,
                palette.paint(&report.input, ansi::BLUE),
                palette.dim("│ template →"),
                palette.paint(path.display().to_string(), ansi::CYAN)
            );
        }
        Outcome::TemplateMissing => {
            println!("  {} {} {}", index, palette.paint(&report.input, ansi::BLUE), palette.paint("│ template not found", ansi::RED));
        }
    }
}
