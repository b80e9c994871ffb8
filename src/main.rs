fn main() {
    if let Err(err) = detail_tracker::run() {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
