//! Plain-text rendering of recipes and lists.

use recipe_lists::{List, Recipe};
use serde::Serialize;

/// Pretty-printed JSON for `--json` output
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One line per recipe: slug and name
pub fn recipes(recipes: &[Recipe]) -> String {
    if recipes.is_empty() {
        return "No recipes.".to_string();
    }

    recipes
        .iter()
        .map(|recipe| format!("{:<24} {}", recipe.slug().unwrap_or("-"), recipe.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full recipe page, followed by the lists it belongs to
pub fn recipe(recipe: &Recipe, lists: &[List]) -> String {
    let mut lines = vec![recipe.name.clone(), "=".repeat(recipe.name.chars().count())];

    if let Some(author) = &recipe.author {
        lines.push(format!("by {author}"));
    }
    if let Some(description) = &recipe.description {
        lines.push(String::new());
        lines.push(description.clone());
    }

    if !recipe.ingredients.is_empty() {
        lines.push(String::new());
        lines.push("Ingredients".to_string());
        lines.extend(recipe.ingredients.iter().map(|i| format!("  - {i}")));
    }

    if !recipe.method.is_empty() {
        lines.push(String::new());
        lines.push("Method".to_string());
        lines.extend(
            recipe
                .method
                .iter()
                .enumerate()
                .map(|(n, step)| format!("  {}. {step}", n + 1)),
        );
    }

    lines.push(String::new());
    lines.push(format!("Source: {}", recipe.url));

    if let Some(slug) = recipe.slug() {
        let containing: Vec<_> = lists
            .iter()
            .filter(|list| list.contains(slug))
            .map(|list| format!("{} (#{})", list.title, list.list_id))
            .collect();
        if !containing.is_empty() {
            lines.push(format!("In your lists: {}", containing.join(", ")));
        }
    }

    lines.join("\n")
}

/// A single list with its recipes
pub fn list(list: &List) -> String {
    let mut lines = vec![format!("#{} {}", list.list_id, list.title)];
    if list.recipes.is_empty() {
        lines.push("  (empty)".to_string());
    }
    lines.extend(
        list.recipes
            .iter()
            .map(|recipe| format!("  - {} [{}]", recipe.name, recipe.slug().unwrap_or("-"))),
    );
    lines.join("\n")
}

/// Every list, separated by blank lines
pub fn lists(lists: &[List]) -> String {
    if lists.is_empty() {
        return "You have no lists yet.".to_string();
    }

    lists.iter().map(list).collect::<Vec<_>>().join("\n\n")
}
