use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("copydown")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Copydown Contributors")
        .about("Turn rendered web pages into clean Markdown")
        .arg(clap::arg!(<INPUT> "Local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (markdown, html, text, json)")
                .value_name("FORMAT")
                .default_value("markdown")
                .value_parser(["markdown", "html", "text", "json"]),
        )
        .arg(clap::arg!(--selector <CSS> "Extract the first element matching this CSS selector").value_name("CSS"))
        .arg(
            clap::arg!(--selection <CSS> "Treat the contents of the first matching element as a user selection")
                .value_name("CSS"),
        )
        .arg(clap::arg!(--url <URL> "URL the page was loaded from").value_name("URL"))
        .arg(clap::arg!(--metadata "Prepend a Source/Captured header (Markdown only)"))
        .arg(
            clap::arg!(--max_bytes <BYTES> "Size in bytes above which stdout output falls back to a file")
                .default_value("1048576"),
        )
        .arg(clap::arg!(--save "Write to a generated filename instead of stdout"))
        .arg(
            clap::arg!(--dir <DIR> "Directory for generated filenames")
                .value_name("DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--remove <CSS> ... "Additional CSS selector to remove as noise").value_name("CSS"))
        .arg(clap::arg!(--keep_hidden "Keep elements hidden with display:none or the hidden attribute"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "copydown", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "copydown", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "copydown", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "copydown", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
