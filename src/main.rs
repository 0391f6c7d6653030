use stress_test::{stress_test_cuts, stress_test_scaling};
use tracing_subscriber::EnvFilter;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main());
    Ok(())
}

async fn async_main() {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            CONCURRENT CUT STRESS TESTS                     ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: few readers, small selector universe (heavy collisions)
    let stats = stress_test_cuts(4, 500, 64).await;
    stats.print();

    // Test 2: more readers, wider universe
    let stats = stress_test_cuts(10, 2000, 512).await;
    stats.print();

    // Test 3: scaling analysis
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS (selector universe)              ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(1024, 256).await;

    println!("\n✓ All stress tests completed successfully!");
}
