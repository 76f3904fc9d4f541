use exprkit::{QueryOpts, Record, SortDirection, Value};

fn person(name: &str, age: i64, city: &str, rank: i64) -> Value {
    Value::record(
        Record::named("Person")
            .with("name", name)
            .with("age", age)
            .with("rank", rank)
            .with("address", Record::named("Address").with("city", city)),
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let people = vec![
        person("Ada", 36, "London", 3),
        person("Alan", 41, "Wilmslow", 1),
        person("Grace", 85, "Arlington", 2),
        person("Anne", 15, "London", 4),
    ];

    let adult = exprkit::parse_predicate("(p: Person) => p.age >= 18")?;
    let a_name = exprkit::parse_predicate(r#"(p: Person) => p.name.starts_with("A")"#)?;
    let in_london = exprkit::parse_predicate(r#"(p: Person) => p.address.city == "London""#)?;

    let pred = adult.and(&a_name)?.or(&in_london)?;
    println!("predicate: {pred}");

    let matches = exprkit::filter(&people, &pred, &QueryOpts::default())?;
    let by_rank = exprkit::parse_selector("(p: Person) => p.rank")?;
    let sorted = exprkit::order_by(&matches, &[(by_rank.clone(), SortDirection::Ascending)])?;
    for p in &sorted {
        println!("  {p}");
    }

    let city = exprkit::parse_selector("(p: Person) => p.address.city")?;
    println!("path: {}", city.full_path()?);
    println!(
        "next rank: {}",
        exprkit::next_sort_order(&people, &by_rank, None)?
    );
    println!("3 < 5: {}", exprkit::evaluate_comparison(3, 5, "<")?);
    Ok(())
}
