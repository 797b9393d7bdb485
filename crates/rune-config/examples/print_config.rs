/// Example program to print the loaded configuration
///
/// Run with: cargo run -p rune-config --example print_config

fn main() {
    let config = match rune_config::MotionConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Rune Motion Configuration ===\n");

    for (label, options) in [("Transition", &config.transition), ("Group", &config.group)] {
        let classes = options.resolve_classes();
        println!("{} Settings:", label);
        println!("  Name: {}", options.prefix());
        println!("  Appear: {}", options.appear);
        println!("  Mode: {:?}", options.mode);
        println!("  Enter: {} / {} / {}", classes.enter, classes.enter_active, classes.enter_to);
        println!("  Exit: {} / {} / {}", classes.exit, classes.exit_active, classes.exit_to);
        println!("  Move: {}", classes.move_);
        println!();
    }

    println!("Runner Settings:");
    println!("  Scenario: {}", config.demo.scenario);
    println!("  Log Filter: {}", config.logging.filter);
}
