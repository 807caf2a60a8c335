fn main() {
    if let Err(err) = impact_series::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
