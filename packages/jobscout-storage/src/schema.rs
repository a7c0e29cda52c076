pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

pub fn render_extensions() -> String {
	include_str!("../../../sql/00_extensions.sql").to_string()
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_jobs.sql" => out.push_str(include_str!("../../../sql/tables/001_jobs.sql")),
				"tables/002_search_history.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_search_history.sql")),
				"tables/003_popular_search_terms.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_popular_search_terms.sql")),
				"tables/004_saved_searches.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_saved_searches.sql")),
				"tables/005_search_alerts.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_search_alerts.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
