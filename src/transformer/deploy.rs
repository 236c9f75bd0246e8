//! Deployment and CI templates for the converted single-page app

use anyhow::{Context, Result};
use serde_json::json;

use crate::models::{NewFile, TargetStack};

/// Hosting platform a template targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Vercel,
    Netlify,
    Github,
    Docker,
}

impl Platform {
    pub const ALL: [Platform; 4] = [Platform::Vercel, Platform::Netlify, Platform::Github, Platform::Docker];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Vercel => "vercel",
            Platform::Netlify => "netlify",
            Platform::Github => "github",
            Platform::Docker => "docker",
        }
    }
}

/// A generated template with the platform it belongs to
#[derive(Debug, Clone)]
pub struct DeployTemplate {
    pub platform: Platform,
    pub file: NewFile,
}

/// Generate every deployment template for `target`
pub fn generate_deploy_configs(target: TargetStack) -> Result<Vec<DeployTemplate>> {
    let mut templates = Vec::new();
    for platform in Platform::ALL {
        templates.push(DeployTemplate {
            platform,
            file: template_for(platform, target)?,
        });
    }
    // The Dockerfile copies this in
    templates.push(DeployTemplate {
        platform: Platform::Docker,
        file: nginx_config(),
    });
    Ok(templates)
}

fn template_for(platform: Platform, target: TargetStack) -> Result<NewFile> {
    Ok(match platform {
        Platform::Vercel => vercel_config(target)?,
        Platform::Netlify => netlify_config(target),
        Platform::Github => github_workflow(),
        Platform::Docker => dockerfile(target),
    })
}

fn vercel_config(target: TargetStack) -> Result<NewFile> {
    let framework = match target {
        TargetStack::ReactVite => "vite",
        TargetStack::ReactCra => "create-react-app",
    };
    let config = json!({
        "framework": framework,
        "buildCommand": target.build_command(),
        "devCommand": target.dev_command(),
        "outputDirectory": target.output_dir(),
        "rewrites": [{ "source": "/(.*)", "destination": "/index.html" }]
    });
    let content = serde_json::to_string_pretty(&config).context("Failed to serialize vercel.json")?;

    Ok(NewFile {
        path: "vercel.json".to_string(),
        content: content + "\n",
        purpose: "Vercel deployment configuration".to_string(),
    })
}

fn netlify_config(target: TargetStack) -> NewFile {
    let content = format!(
        r#"[build]
  command = "{build}"
  publish = "{output}"

[dev]
  command = "{dev}"

[[redirects]]
  from = "/*"
  to = "/index.html"
  status = 200
"#,
        build = target.build_command(),
        output = target.output_dir(),
        dev = target.dev_command(),
    );

    NewFile {
        path: "netlify.toml".to_string(),
        content,
        purpose: "Netlify deployment configuration".to_string(),
    }
}

fn github_workflow() -> NewFile {
    let content = r#"name: Build and Deploy

on:
  push:
    branches: [ main ]
  pull_request:
    branches: [ main ]

jobs:
  build:
    runs-on: ubuntu-latest

    steps:
    - uses: actions/checkout@v4

    - name: Setup Node.js
      uses: actions/setup-node@v4
      with:
        node-version: '18'
        cache: 'npm'

    - name: Install dependencies
      run: npm ci

    - name: Build
      run: npm run build

    - name: Run tests
      run: npm test
"#;

    NewFile {
        path: ".github/workflows/main.yml".to_string(),
        content: content.to_string(),
        purpose: "GitHub Actions workflow".to_string(),
    }
}

fn dockerfile(target: TargetStack) -> NewFile {
    let content = format!(
        r#"FROM node:18-alpine AS build

WORKDIR /app

COPY package*.json ./
RUN npm ci

COPY . .
RUN npm run build

FROM nginx:stable-alpine

COPY --from=build /app/{output} /usr/share/nginx/html
COPY nginx.conf /etc/nginx/conf.d/default.conf

EXPOSE 80

CMD ["nginx", "-g", "daemon off;"]
"#,
        output = target.output_dir(),
    );

    NewFile {
        path: "Dockerfile".to_string(),
        content,
        purpose: "Docker configuration for containerized deployment".to_string(),
    }
}

fn nginx_config() -> NewFile {
    let content = r#"server {
    listen 80;
    root /usr/share/nginx/html;
    index index.html;

    location / {
        try_files $uri $uri/ /index.html;
    }
}
"#;

    NewFile {
        path: "nginx.conf".to_string(),
        content: content.to_string(),
        purpose: "nginx SPA fallback used by the Dockerfile".to_string(),
    }
}
