use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "shop-story",
    version,
    about = "Scroll-driven story about what makes a top TikTok shop"
)]
pub struct CliArgs {
    /// Print the story summary and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Write every chart as SVG into DIR and exit
    #[arg(long = "export-svg", value_name = "DIR")]
    pub export_svg: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory holding the two data files
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Override the shop records file name
    #[arg(long, value_name = "FILE")]
    pub shops: Option<String>,

    /// Override the category aggregates file name
    #[arg(long, value_name = "FILE")]
    pub categories: Option<String>,

    /// Load narrative steps from a JSON file instead of the built-in story
    #[arg(long, value_name = "PATH")]
    pub steps: Option<String>,

    /// Number of shops ranked as top
    #[arg(long = "top-n", value_name = "N")]
    pub top_n: Option<usize>,

    /// Initial category filter ("All" for every category)
    #[arg(long, value_name = "NAME")]
    pub category: Option<String>,
}

impl CliArgs {
    /// Flags win over `.env` and the environment: they are written into the
    /// environment before the config is read.
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("STORY_DATA_DIR", dir);
        }
        if let Some(file) = &self.shops {
            std::env::set_var("SHOP_DATA_FILE", file);
        }
        if let Some(file) = &self.categories {
            std::env::set_var("CATEGORY_DATA_FILE", file);
        }
        if let Some(path) = &self.steps {
            std::env::set_var("STORY_STEPS_FILE", path);
        }
        if let Some(top_n) = self.top_n {
            std::env::set_var("STORY_TOP_N", top_n.to_string());
        }
        if let Some(category) = &self.category {
            std::env::set_var("STORY_CATEGORY", category);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    pub const fn wants_headless(&self) -> bool {
        self.headless || self.json || self.export_svg.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_story_flags() {
        let args = CliArgs::parse_from([
            "shop-story",
            "--top-n",
            "5",
            "--category",
            "Beauty",
            "--export-svg",
            "out",
        ]);
        assert_eq!(args.top_n, Some(5));
        assert_eq!(args.category.as_deref(), Some("Beauty"));
        assert_eq!(args.export_svg, Some(PathBuf::from("out")));
        assert!(args.wants_headless());
    }

    #[test]
    fn plain_run_is_interactive() {
        let args = CliArgs::parse_from(["shop-story"]);
        assert!(!args.wants_headless());
        assert!(CliArgs::try_parse_from(["shop-story", "--top-n", "ten"]).is_err());
    }
}
