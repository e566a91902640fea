fn main() {
    if let Err(error) = stowage_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
