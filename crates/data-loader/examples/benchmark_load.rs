use data_loader::MovieTable;
use std::path::Path;
use std::time::Instant;

fn main() {
    let movies = Path::new("data/movies.csv");
    let credits = Path::new("data/credits.csv");

    println!("Loading TMDB movies + credits...\n");

    let start = Instant::now();
    let table = MovieTable::load_from_files(movies, credits)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Joined rows: {}", table.len());
    println!("Dropped rows: {}", table.dropped_rows());
    println!("\nPerformance: {:.0} rows/second",
             table.len() as f64 / elapsed.as_secs_f64());
}
