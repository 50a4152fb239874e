fn main() {
    if let Err(error) = quickglyph_core::logging::init() {
        eprintln!("[quickglyph-core] logging disabled: {error}");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match quickglyph_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[quickglyph-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = quickglyph_core::runtime::run_with_options(options) {
        log::error!("runtime failed: {error}");
        eprintln!("[quickglyph-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
