//! The `shellenv` command: print the PATH snippet for the user's shell.

use br::Prefix;
use colored::Colorize;

pub fn shellenv(prefix: &Prefix) {
    let shell = std::env::var("SHELL").unwrap_or_default();
    let bin_dir = prefix.bin_dir();

    let (profile, snippet) = if shell.contains("zsh") {
        (
            "~/.zshrc",
            format!("export PATH=\"{}:$PATH\"", bin_dir.display()),
        )
    } else if shell.contains("fish") {
        (
            "~/.config/fish/config.fish",
            format!("fish_add_path -gP \"{}\"", bin_dir.display()),
        )
    } else {
        (
            "~/.bashrc",
            format!("export PATH=\"{}:$PATH\"", bin_dir.display()),
        )
    };

    println!("{}", format!("# Add this to your {}:", profile).green().bold());
    println!("{}", snippet);
}
