use crate::context::Docshelf;
use anyhow::Result;
use clap::Parser;
use docshelf_catalog::Category;
use docshelf_catalog::doc_href;
use docshelf_markdown::format_toc;
use docshelf_markdown::preview;
use docshelf_markdown::render_html;
use docshelf_markdown::table_of_contents;
use docshelf_search::SearchView;

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Only list documents of this role
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,
}

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Text to look for in titles, descriptions and headings
    #[arg(value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Role to search in (defaults to the first role)
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Print the view as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Document slug, as one argument or as route segments
    #[arg(value_name = "SLUG", required = true, num_args = 1..)]
    pub slug: Vec<String>,

    /// Render to HTML instead of printing Markdown
    #[arg(long)]
    pub html: bool,

    /// Only print the beginning of the document
    #[arg(long)]
    pub preview: bool,
}

#[derive(Debug, Parser)]
pub struct TocArgs {
    /// Document slug, as one argument or as route segments
    #[arg(value_name = "SLUG", required = true, num_args = 1..)]
    pub slug: Vec<String>,
}

pub fn run_roles(docs: &Docshelf) -> Result<()> {
    for role in docs.catalog.roles() {
        println!(
            "{}\t{}\t{} documents",
            role.id,
            role.name,
            role.categories.len()
        );
    }
    Ok(())
}

pub fn run_list(docs: &Docshelf, args: ListArgs) -> Result<()> {
    match args.role {
        Some(role_id) => {
            let role = docs.catalog.role(&role_id)?;
            role.categories.iter().for_each(print_category);
        }
        None => docs.catalog.categories().for_each(print_category),
    }
    Ok(())
}

pub async fn run_search(docs: &Docshelf, args: SearchArgs) -> Result<()> {
    let session = docs.session();
    if let Some(role_id) = &args.role {
        session.select_role(role_id)?;
    }
    let view = session.search(&args.query).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&session.visible_categories(&view), &view);
    }
    session.shutdown();
    Ok(())
}

pub async fn run_show(docs: &Docshelf, args: ShowArgs) -> Result<()> {
    let route = docs.catalog.resolve_segments(&args.slug)?;
    let body = docs.body(&route).await?;
    let body = if args.preview {
        preview(&body, docs.config.render.preview_chars)
    } else {
        body.as_str()
    };
    if args.html {
        print!("{}", render_html(body));
    } else {
        println!("{body}");
    }
    Ok(())
}

pub async fn run_toc(docs: &Docshelf, args: TocArgs) -> Result<()> {
    let route = docs.catalog.resolve_segments(&args.slug)?;
    let body = docs.body(&route).await?;
    print!("{}", format_toc(&table_of_contents(&body, docs.config.toc.max_level)));
    Ok(())
}

pub fn run_routes(docs: &Docshelf) -> Result<()> {
    for segments in docs.catalog.route_params() {
        println!("{}", doc_href(&segments.join("/")));
    }
    Ok(())
}

fn print_category(category: &Category) {
    println!(
        "{}\t{}\t{}",
        category.slug,
        category.title,
        doc_href(&category.slug)
    );
}

fn print_view(visible: &[Category], view: &SearchView) {
    let Some(results) = &view.results else {
        visible.iter().for_each(print_category);
        return;
    };
    if results.is_empty() {
        println!("No documents match {:?}", view.query);
        return;
    }
    for result in results {
        let href = doc_href(&result.category.slug);
        let marker = if result.title_match { " [title]" } else { "" };
        println!("{}\t{href}{marker}", result.category.title);
        for heading in &result.heading_matches {
            println!(
                "  {} {}\t{href}#{}",
                "#".repeat(usize::from(heading.level)),
                heading.text,
                heading.anchor
            );
        }
    }
}
