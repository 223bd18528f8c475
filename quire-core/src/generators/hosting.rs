//! Static hosting provider files (headers, SPA fallbacks).

use super::{write_artifact, GenerateError};
use crate::cancel::CancellationToken;
use crate::config::{GeneratorConfig, HostingProvider};
use serde_json::json;
use std::path::PathBuf;

const CLOUDFLARE_HEADERS: &str = "\
# Cloudflare Pages headers
# https://developers.cloudflare.com/pages/platform/headers

# Cache static assets
/_framework/*
  Cache-Control: public, max-age=31536000, immutable

/css/*
  Cache-Control: public, max-age=31536000, immutable

/images/*
  Cache-Control: public, max-age=86400

# HTML pages revalidate
/*.html
  Cache-Control: public, max-age=0, must-revalidate

/*/index.html
  Cache-Control: public, max-age=0, must-revalidate

# Security headers
/*
  X-Content-Type-Options: nosniff
  X-Frame-Options: DENY
  Referrer-Policy: strict-origin-when-cross-origin
";

const NETLIFY_HEADERS: &str = "\
# Netlify headers
# https://docs.netlify.com/routing/headers/

/_framework/*
  Cache-Control: public, max-age=31536000, immutable

/css/*
  Cache-Control: public, max-age=31536000, immutable

/images/*
  Cache-Control: public, max-age=86400

/*.html
  Cache-Control: public, max-age=0, must-revalidate

/*
  X-Content-Type-Options: nosniff
  X-Frame-Options: DENY
  Referrer-Policy: strict-origin-when-cross-origin
";

const SPA_FALLBACK: &str = "/*  /index.html  200\n";

const GITHUB_404: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Redirecting...</title>
    <script>
        var path = window.location.pathname;
        if (path !== '/' && path !== '/index.html') {
            sessionStorage.setItem('redirectPath', path);
            window.location.replace('/');
        }
    </script>
</head>
<body>Redirecting...</body>
</html>
"#;

pub struct HostingConfigGenerator<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> HostingConfigGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Write the files for the configured provider; returns their paths
    pub fn generate(&self, cancel: &CancellationToken) -> Result<Vec<PathBuf>, GenerateError> {
        let files = self.files()?;
        let mut written = Vec::with_capacity(files.len());

        for (name, contents) in files {
            let path = self.config.output_path.join(name);
            write_artifact(&path, &contents, cancel)?;
            tracing::info!("Created {:?}", path);
            written.push(path);
        }

        if written.is_empty() {
            tracing::debug!("No hosting files for provider {}", self.config.hosting_provider.as_str());
        }
        Ok(written)
    }

    fn files(&self) -> Result<Vec<(&'static str, String)>, GenerateError> {
        let files = match self.config.hosting_provider {
            HostingProvider::Cloudflare => vec![
                ("_headers", CLOUDFLARE_HEADERS.to_string()),
                (
                    "_redirects",
                    format!("# Cloudflare Pages redirects\n{}", SPA_FALLBACK),
                ),
            ],
            HostingProvider::Netlify => vec![
                ("_headers", NETLIFY_HEADERS.to_string()),
                ("_redirects", format!("# Netlify redirects\n{}", SPA_FALLBACK)),
            ],
            HostingProvider::Vercel => vec![("vercel.json", vercel_config()?)],
            HostingProvider::Github => vec![
                (".nojekyll", String::new()),
                ("404.html", GITHUB_404.to_string()),
            ],
            HostingProvider::None => Vec::new(),
        };
        Ok(files)
    }
}

fn vercel_config() -> Result<String, serde_json::Error> {
    let cache = |source: &str, value: &str| {
        json!({
            "source": source,
            "headers": [{ "key": "Cache-Control", "value": value }]
        })
    };
    let immutable = "public, max-age=31536000, immutable";

    serde_json::to_string_pretty(&json!({
        "rewrites": [{
            "source": "/((?!_framework|css|images|content|.*\\..*).*)",
            "destination": "/index.html"
        }],
        "headers": [
            cache("/_framework/(.*)", immutable),
            cache("/css/(.*)", immutable),
            cache("/images/(.*)", "public, max-age=86400"),
            cache("/(.*)\\.html", "public, max-age=0, must-revalidate"),
        ]
    }))
}
