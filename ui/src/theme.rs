pub const GLOBAL_CSS: &str = r#"
:root {
  --bg: #000000;
  --panel: #000000;
  --border: #374151;
  --border-strong: #4b5563;
  --text: #e2e8f0;
  --text-dim: #cbd5e1;
  --accent: #3b82f6;
  --accent-strong: #2563eb;
  --surface-hover: #1f2937;
  --negative: #f0635c;
  --shadow-soft: 0 14px 42px rgba(0, 0, 0, 0.38);
  --radius: 8px;
  --radius-button: 12px;
  --space-1: 4px;
  --space-2: 8px;
  --space-3: 12px;
  --space-4: 16px;
  --font-body: "Inter", "SF Pro Text", system-ui, -apple-system, sans-serif;
  --font-size-sm: 13px;
  --font-size-md: 15px;
  --font-size-xl: 24px;
  --transition: 140ms ease-out;
}

* { box-sizing: border-box; }
html, body {
  padding: 0;
  margin: 0;
  background: var(--bg);
  color: var(--text);
  font-family: var(--font-body);
  font-size: var(--font-size-sm);
  line-height: 1.4;
  letter-spacing: 0.01em;
}

.page { height: 100vh; overflow: hidden; background: var(--bg); }
.page-stack { display: flex; flex-direction: column; gap: var(--space-4); height: 100%; padding: var(--space-4); }
.page-title { margin: 0; font-size: var(--font-size-xl); font-weight: 700; color: var(--text); }

.tf-group { display: flex; gap: var(--space-2); }
.tf-button { border: 1px solid var(--border); background: transparent; color: var(--text-dim); padding: 6px 20px; border-radius: var(--radius-button); font-size: var(--font-size-sm); font-weight: 600; cursor: pointer; transition: background var(--transition), border-color var(--transition), color var(--transition); }
.tf-button:hover { background: var(--surface-hover); }
.tf-button.active { background: var(--accent); border-color: var(--accent); color: #fff; }
.tf-button.active:hover { background: var(--accent-strong); }

.chart-panel { flex: 1; min-height: 0; padding: var(--space-3); background: var(--panel); border-radius: var(--radius); box-shadow: var(--shadow-soft); position: relative; }
.chart-container { position: relative; width: 100%; height: 100%; overflow: hidden; }

.alert { display: flex; align-items: center; gap: var(--space-3); margin: var(--space-4); padding: var(--space-3) var(--space-4); border-radius: var(--radius); font-size: var(--font-size-md); }
.alert-error { color: #fdecea; background: rgba(240, 99, 92, 0.12); border: 1px solid rgba(240, 99, 92, 0.4); }
.alert .tf-button { margin-left: auto; }
"#;
