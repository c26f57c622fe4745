//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling.
# Locale used for month names, e.g. en_US or pt_BR
language: en_US
timezone: UTC

# Date / Time format
date_format: DD MMM YYYY
time_format: HH:mm

# Directory
public_dir: public
static_dir: static

# Home page
home:
  page_size: 2

# Seconds before a rendered page is regenerated
revalidate: 3600
# Seconds an on-demand post render may take
fallback_timeout: 10
reading_time: 4 min

# Content service. PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN
# override the values below.
content:
  repository: spacetraveling
  # endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  # access_token: ''
  preview_toolbar: true

# Comments (utterances); leave repo empty to disable
comments:
  # repo: owner/repository
  issue_term: pathname
  theme: github-dark

labels:
  home: Home
  load_more: Load more posts
  loading: Loading...
  edited_on: edited on
  at: at
  not_found: Post not found
  unavailable: This post is temporarily unavailable
"#;

const DEFAULT_STYLESHEET: &str = r#"body {
  margin: 0;
  background: #1a1d23;
  color: #d7d7d7;
  font-family: 'Inter', sans-serif;
}

.container {
  max-width: 720px;
  margin: 0 auto;
  padding: 0 1rem;
}

.post-card {
  display: block;
  margin-top: 3rem;
  color: inherit;
  text-decoration: none;
}

.post-card h2 {
  color: #f8f8f8;
}

.info span + span {
  margin-left: 1.5rem;
}

.banner {
  height: 400px;
  background-size: cover;
  background-position: center;
}

.edited {
  font-style: italic;
}

#load-more {
  margin: 4rem 0;
  border: 0;
  background: none;
  color: #ff57b2;
  font-weight: 600;
  cursor: pointer;
}
"#;

/// Initialize a new blog in the given directory
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    // Create directory structure
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("static/images"))?;
    fs::create_dir_all(target_dir.join("static/styles"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("Keeping existing {:?}", config_path);
    } else {
        fs::write(&config_path, DEFAULT_CONFIG)?;
    }

    let stylesheet = target_dir.join("static/styles/main.css");
    if !stylesheet.exists() {
        fs::write(stylesheet, DEFAULT_STYLESHEET)?;
    }

    Ok(())
}
