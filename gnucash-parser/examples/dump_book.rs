use gnucash_parser::parse_str;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let filename = std::env::args().nth(1).ok_or("filename argument")?;
    let xml = std::fs::read_to_string(filename)?;

    let load = parse_str(&xml)?;
    for warning in &load.warnings {
        eprintln!("warning: {:?}", warning);
    }
    for (account, _children, splits) in load.book.walk() {
        println!("{}\t{}\t{} splits", account.ty.as_tag(), account.fullname, splits.len());
    }
    Ok(())
}

fn main() {
    match run() {
        Err(e) => println!("Error: {}", e),
        _ => {}
    }
}
