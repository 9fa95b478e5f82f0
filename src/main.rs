fn main() {
    if let Err(err) = slide_schema_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
