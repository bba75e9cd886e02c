fn main() {
    if let Err(e) = parseflow_drv::main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
