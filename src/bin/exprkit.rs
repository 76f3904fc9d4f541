use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "exprkit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the member path a selector reads, e.g. `address.city`.
    Path(PathArgs),
    /// Compare two JSON scalars with `<`, `<=`, `>` or `>=`.
    Compare(CompareArgs),
    /// Filter (and optionally sort) a JSON array of records.
    Filter(FilterArgs),
    /// Print one past the largest integer key among matching records.
    NextSortOrder(NextSortOrderArgs),
    /// Parse a lambda and print it back in canonical form.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// Selector source, e.g. `p => p.address.city`.
    #[arg(long)]
    selector: String,

    /// Prefix the path with this owner type name.
    #[arg(long)]
    owner: Option<String>,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Left operand (JSON scalar; anything else is taken as a string).
    a: String,
    /// Right operand (JSON scalar; anything else is taken as a string).
    b: String,
    /// Operator token.
    op: String,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    /// Input records (JSON array of objects).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Base predicate.
    #[arg(long = "where")]
    predicate: String,

    /// Predicates AND-ed onto the base, in order.
    #[arg(long = "and")]
    and: Vec<String>,

    /// Predicates OR-ed onto the result after every `--and`, in order.
    #[arg(long = "or")]
    or: Vec<String>,

    /// Sort matches by this selector.
    #[arg(long)]
    order_by: Option<String>,

    /// Sort descending (requires `--order-by`).
    #[arg(long, requires = "order_by")]
    desc: bool,

    /// Evaluate the predicate with rayon.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct NextSortOrderArgs {
    /// Input records (JSON array of objects).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Selector yielding the integer sort key.
    #[arg(long)]
    key: String,

    /// Only consider records matching this predicate.
    #[arg(long = "where")]
    predicate: Option<String>,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Lambda source.
    #[arg(long)]
    expr: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Path(args) => cmd_path(args),
        Command::Compare(args) => cmd_compare(args),
        Command::Filter(args) => cmd_filter(args),
        Command::NextSortOrder(args) => cmd_next_sort_order(args),
        Command::Show(args) => cmd_show(args),
    }
}

fn read_records(path: &Path) -> anyhow::Result<Vec<exprkit::Value>> {
    let f = File::open(path).with_context(|| format!("open records '{}'", path.display()))?;
    let r = BufReader::new(f);
    let rows: Vec<serde_json::Value> =
        serde_json::from_reader(r).with_context(|| "parse records JSON (expected an array)")?;
    rows.into_iter()
        .map(|row| exprkit::Value::try_from(row).map_err(anyhow::Error::from))
        .collect()
}

fn scalar(s: &str) -> anyhow::Result<exprkit::Value> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(v) => Ok(exprkit::Value::try_from(v)?),
        Err(_) => Ok(exprkit::Value::from(s)),
    }
}

fn cmd_path(args: PathArgs) -> anyhow::Result<()> {
    let selector = exprkit::parse_selector(&args.selector)?;
    let path = match &args.owner {
        Some(owner) => exprkit::full_path_of(selector.lambda(), owner)?,
        None => exprkit::path_of(selector.lambda())?,
    };
    println!("{path}");
    Ok(())
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let a = scalar(&args.a)?;
    let b = scalar(&args.b)?;
    let res = exprkit::evaluate_comparison(a, b, &args.op)?;
    println!("{res}");
    Ok(())
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let records = read_records(&args.in_path)?;

    let mut pred = exprkit::parse_predicate(&args.predicate)
        .with_context(|| format!("parse --where '{}'", args.predicate))?;
    for src in &args.and {
        let p = exprkit::parse_predicate(src).with_context(|| format!("parse --and '{src}'"))?;
        pred = pred.and(&p)?;
    }
    for src in &args.or {
        let p = exprkit::parse_predicate(src).with_context(|| format!("parse --or '{src}'"))?;
        pred = pred.or(&p)?;
    }

    let opts = exprkit::QueryOpts {
        parallel: args.parallel,
        threads: args.threads,
        ..Default::default()
    };
    let mut out = exprkit::filter(&records, &pred, &opts)?;

    if let Some(src) = &args.order_by {
        let key = exprkit::parse_selector(src).with_context(|| format!("parse --order-by '{src}'"))?;
        let dir = if args.desc {
            exprkit::SortDirection::Descending
        } else {
            exprkit::SortDirection::Ascending
        };
        out = exprkit::order_by(&out, &[(key, dir)])?;
    }

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &out).with_context(|| "write records JSON")?;
    writeln!(stdout)?;
    eprintln!("{} of {} records matched {pred}", out.len(), records.len());
    Ok(())
}

fn cmd_next_sort_order(args: NextSortOrderArgs) -> anyhow::Result<()> {
    let records = read_records(&args.in_path)?;
    let key = exprkit::parse_selector(&args.key)?;
    let filter = args
        .predicate
        .as_deref()
        .map(exprkit::parse_predicate)
        .transpose()?;
    let next = exprkit::next_sort_order(&records, &key, filter.as_ref())?;
    println!("{next}");
    Ok(())
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let lambda = exprkit::parse_lambda(&args.expr)?;
    println!("{lambda}");
    Ok(())
}
