fn main() {
    let args: Vec<String> = std::env::args().collect();
    let md = if args.len() > 1 {
        std::fs::read_to_string(&args[1]).expect("Failed to read file")
    } else {
        "# Scope\n\n| Phase | Owner |\n| --- | --- |\n| Discovery | **PM** |".to_string()
    };

    for block in sowdoc::parse(&md) {
        println!("{block:?}");
    }
}
