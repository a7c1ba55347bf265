use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=templates/");

    // Tailwind standalone CLI, when installed
    let status = Command::new("tailwindcss")
        .args([
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            let fallback = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #0f172a; background: #f8fafc; -webkit-font-smoothing: antialiased; }
.min-h-screen { min-height: 100vh; }
.mx-auto { margin-left: auto; margin-right: auto; }
.max-w-5xl { max-width: 64rem; }
.max-w-3xl { max-width: 48rem; }
.max-w-xl { max-width: 36rem; }
.max-w-md { max-width: 28rem; }
.px-4 { padding-left: 1rem; padding-right: 1rem; }
.py-8 { padding-top: 2rem; padding-bottom: 2rem; }
.py-16 { padding-top: 4rem; padding-bottom: 4rem; }
.mb-2 { margin-bottom: 0.5rem; }
.mb-4 { margin-bottom: 1rem; }
.mb-6 { margin-bottom: 1.5rem; }
.mb-8 { margin-bottom: 2rem; }
.mt-4 { margin-top: 1rem; }
.mt-8 { margin-top: 2rem; }
.flex { display: flex; }
.justify-center { justify-content: center; }
.gap-4 { gap: 1rem; }
.text-center { text-align: center; }
.text-sm { font-size: 0.875rem; }
.text-lg { font-size: 1.125rem; }
.text-xl { font-size: 1.25rem; }
.text-2xl { font-size: 1.5rem; }
.text-3xl { font-size: 1.875rem; }
.text-4xl { font-size: 2.25rem; }
.font-semibold { font-weight: 600; }
.font-bold { font-weight: 700; }
.text-muted { color: #64748b; }
a { color: inherit; text-decoration: none; }
a:hover { opacity: 0.8; }
.site-header { background: #fff; border-bottom: 1px solid #e2e8f0; }
.nav { display: flex; align-items: center; justify-content: space-between; padding-top: 0.75rem; padding-bottom: 0.75rem; }
.nav-links { display: flex; align-items: center; gap: 1.25rem; font-size: 0.875rem; }
.brand { font-weight: 700; font-size: 1.25rem; color: #0369a1; }
.site-footer { text-align: center; padding: 2rem 1rem; border-top: 1px solid #e2e8f0; margin-top: 4rem; }
.grid-3 { display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.5rem 1rem; border-radius: 0.5rem; font-size: 0.875rem; font-weight: 500; cursor: pointer; border: none; }
.btn-primary { background: #0369a1; color: #fff; }
.btn-primary:hover { background: #075985; }
.btn-secondary { background: #fff; color: #0f172a; border: 1px solid #cbd5e1; }
.btn-danger { background: #b91c1c; color: #fff; }
.card { background: #fff; border-radius: 0.75rem; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 1px 2px 0 rgb(0 0 0 / 0.05); }
.icon-badge { font-size: 2rem; color: #0369a1; margin-bottom: 1rem; }
.avatar { width: 8rem; height: 8rem; border-radius: 9999px; margin: 0 auto 1rem; object-fit: cover; }
.form { display: flex; flex-direction: column; gap: 0.5rem; }
.form label { font-size: 0.875rem; font-weight: 600; margin-top: 0.5rem; }
.form input, .form select { padding: 0.5rem 0.75rem; border: 1px solid #cbd5e1; border-radius: 0.5rem; font-size: 1rem; background: #fff; }
.field-error { color: #b91c1c; font-size: 0.875rem; }
.notice { padding: 0.75rem 1rem; border-radius: 0.5rem; margin-bottom: 1rem; }
.notice-success { background: #dcfce7; color: #166534; }
.notice-error { background: #fee2e2; color: #991b1b; }
.table { width: 100%; border-collapse: collapse; background: #fff; }
.table th, .table td { padding: 0.75rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
.table th { background: #f1f5f9; font-size: 0.875rem; }
.actions { display: flex; gap: 0.75rem; }
.danger { color: #b91c1c; }
.pagination { display: flex; gap: 0.5rem; justify-content: center; margin-top: 1.5rem; }
.pagination a, .pagination span { padding: 0.25rem 0.75rem; border: 1px solid #cbd5e1; border-radius: 0.375rem; }
.pagination .current { background: #0369a1; color: #fff; border-color: #0369a1; }
"#;
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", fallback).ok();
        }
    }
}
