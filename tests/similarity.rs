use anyhow::Result;
use nutridb::{filter_recipes, MacroBounds, Nutrient, Range, Recipe, RecipeDB};

fn recipe(id: u64, ingredients: &str, calories: f64) -> Recipe {
    Recipe {
        id,
        label: format!("recipe {id}"),
        ingredients: ingredients.into(),
        ingredient_lines: String::new(),
        proteins_per_serving: id as f64 * 3.0,
        calories_per_serving: calories,
        fats_per_serving: 8.0,
        carbs_per_serving: 25.0,
        url: String::new(),
    }
}

fn catalog() -> Vec<Recipe> {
    vec![
        recipe(1, "chicken rice broccoli", 520.0),
        recipe(2, "chicken rice peas", 480.0),
        recipe(3, "chocolate sugar flour", 610.0),
        recipe(4, "salmon rice lemon dill", 450.0),
        recipe(5, "lemon sugar flour butter eggs", 390.0),
        recipe(6, "", 120.0),
        recipe(7, "broccoli garlic olive oil", 180.0),
    ]
}

#[test]
fn never_returns_query() -> Result<()> {
    let db = RecipeDB::build(catalog())?;
    for r in db.recipes() {
        let results = db.top_similar(r.id, 10)?;
        assert!(results.iter().all(|s| s.id != r.id));
        assert_eq!(results.len(), db.len() - 1);
    }
    Ok(())
}

#[test]
fn descending_scores_in_unit_interval() -> Result<()> {
    let db = RecipeDB::build(catalog())?;
    let results = db.top_similar(4, 5)?;
    assert_eq!(results.len(), 5);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(results.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    Ok(())
}

#[test]
fn self_similarity_and_symmetry() -> Result<()> {
    let db = RecipeDB::build(catalog())?;
    for a in db.recipes() {
        if !a.ingredients.is_empty() {
            assert!((db.similarity(a.id, a.id)? - 1.0).abs() < 1e-9);
        }
        for b in db.recipes() {
            assert_eq!(db.similarity(a.id, b.id)?, db.similarity(b.id, a.id)?);
        }
    }
    Ok(())
}

#[test]
fn empty_ingredients_rank_last() -> Result<()> {
    let db = RecipeDB::build(catalog())?;
    let results = db.top_similar(1, 10)?;
    let last = results.last().expect("results");
    assert_eq!(last.score, 0.0);
    let empty = results.iter().find(|s| s.id == 6).expect("recipe 6 ranked");
    assert_eq!(empty.score, 0.0);
    Ok(())
}

#[test]
fn single_recipe_catalog() -> Result<()> {
    let db = RecipeDB::build(vec![recipe(1, "chicken rice", 400.0)])?;
    assert!(db.top_similar(1, 5)?.is_empty());
    Ok(())
}

#[test]
fn batch_matches_single() -> Result<()> {
    let db = RecipeDB::build(catalog())?;
    let ids = [1, 3, 7];
    let batch = db.top_similar_batch(&ids, 3)?;
    for (id, results) in ids.iter().zip(batch) {
        assert_eq!(results, db.top_similar(*id, 3)?);
    }
    assert!(db.top_similar_batch(&[1, 99], 3).is_err());
    Ok(())
}

#[test]
fn rebuild_is_idempotent() -> Result<()> {
    let a = RecipeDB::build(catalog())?;
    let b = RecipeDB::build(catalog())?;
    assert_eq!(a.index(), b.index());
    assert_eq!(a.fingerprint(), b.fingerprint());
    Ok(())
}

#[test]
fn calorie_ceiling() {
    let catalog = catalog();
    let bounds = MacroBounds::default().with(Nutrient::Calories, Range::new(0.0, 500.0));
    let none: [&str; 0] = [];
    let filtered = filter_recipes(&catalog, &bounds, &none);
    assert!(filtered.iter().all(|r| r.calories_per_serving <= 500.0));
    assert_eq!(filtered.len(), 5);
}

#[test]
fn empty_terms_match_no_filter() {
    let catalog = catalog();
    let bounds = MacroBounds::default().with(Nutrient::Proteins, Range::new(5.0, 15.0));
    let none: [&str; 0] = [];
    let ids = |rs: Vec<&Recipe>| rs.iter().map(|r| r.id).collect::<Vec<_>>();
    let with_empty = ids(filter_recipes(&catalog, &bounds, &none));
    let admitted = ids(catalog.iter().filter(|r| bounds.admits(&r.macros())).collect());
    assert_eq!(with_empty, admitted);
    assert_eq!(with_empty, vec![2, 3, 4, 5]);
}
