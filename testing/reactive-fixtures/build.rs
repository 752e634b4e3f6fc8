fn main() -> Result<(), Box<dyn std::error::Error>> {
    reactive_property::build!();

    Ok(())
}
