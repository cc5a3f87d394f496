fn main() {
    #[cfg(feature = "cli")]
    sonopix::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("sonopix: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
