//! List the fragments applying to a person.

use super::{load, Paths};
use anyhow::Result;
use dlm_types::Person;

pub fn audience(paths: &Paths, user: &str, attributes: Vec<(String, String)>) -> Result<()> {
    let (activator, _) = load(paths)?;
    let person = attributes
        .into_iter()
        .fold(Person::new(user), |person, (name, value)| {
            person.with_attribute(name, value)
        });

    let views = activator.applicable_views(&person);
    if views.is_empty() {
        println!("No fragments apply to {user}");
        return Ok(());
    }

    println!("Fragments for {user}, in merge order:");
    for view in views {
        println!(
            "  {} ({}, precedence {}) {}",
            view.fragment_name,
            view.owner,
            view.precedence,
            view.label()
        );
    }
    Ok(())
}
