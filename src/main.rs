//! `discovery` (disc) - RICE idea board
//!
//! Score ideas with Reach, Impact, Confidence and Effort, rank them in a
//! table and move them across a six-column kanban board.

use discovery::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
