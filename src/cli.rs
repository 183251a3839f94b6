use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "screenshot-triage")]
#[command(about = "スクリーンショットOCR・優先度トリアージツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ストアファイル（省略時は設定値）
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 設定フォルダを再スキャンして新しい画像を取り込む
    Scan {
        /// スキャン対象フォルダ（省略時は設定値）
        #[arg(short, long)]
        folder: Vec<PathBuf>,
    },

    /// 画像をアップロードフォルダに保存して取り込む
    Upload {
        /// 画像ファイル
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// 優先度順に一覧表示
    List {
        /// 非表示にした項目を表示
        #[arg(long)]
        dismissed: bool,

        /// 延期中の項目を表示
        #[arg(long, conflicts_with = "dismissed")]
        deferred: bool,

        /// 表示件数
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// 項目を非表示にする
    Dismiss {
        /// 項目ID（前方一致可）
        id: String,
    },

    /// 非表示の項目を戻す
    Restore {
        /// 項目ID（前方一致可）
        id: String,
    },

    /// 項目を延期する
    Defer {
        /// 項目ID（前方一致可）
        id: String,

        /// 延期する分数（省略時は設定値）
        #[arg(short, long)]
        minutes: Option<i64>,
    },

    /// 全項目を非表示にする
    DismissAll,

    /// 非表示の全項目を戻す
    RestoreAll,

    /// アクティブ項目の優先度を母集団全体で再配置
    Rebalance,

    /// テキストの緊急度・行動必要度を解析
    Analyze {
        /// 解析するテキスト
        #[arg(required = true)]
        text: String,
    },

    /// 全項目を削除
    Purge {
        /// 確認を省略
        #[arg(short, long)]
        yes: bool,

        /// アップロードフォルダの画像も削除
        #[arg(long)]
        delete_files: bool,
    },

    /// 期限切れのアップロード画像を削除
    Cleanup,

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 設定を変更（KEY=VALUE）
        #[arg(long, value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defer() {
        let cli = Cli::try_parse_from(["screenshot-triage", "defer", "3f2a", "--minutes", "30"]).unwrap();
        match cli.command {
            Commands::Defer { id, minutes } => {
                assert_eq!(id, "3f2a");
                assert_eq!(minutes, Some(30));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_parse_list_options() {
        let cli = Cli::try_parse_from(["screenshot-triage", "-v", "list", "--dismissed", "-n", "5"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::List { dismissed: true, deferred: false, limit: Some(5) }
        ));
    }

    #[test]
    fn test_list_deferred_conflicts_with_dismissed() {
        let cli = Cli::try_parse_from(["screenshot-triage", "list", "--deferred"]).unwrap();
        assert!(matches!(cli.command, Commands::List { deferred: true, .. }));
        assert!(Cli::try_parse_from(["screenshot-triage", "list", "--deferred", "--dismissed"]).is_err());
    }

    #[test]
    fn test_upload_requires_files() {
        assert!(Cli::try_parse_from(["screenshot-triage", "upload"]).is_err());
    }

    #[test]
    fn test_parse_config_set_multiple() {
        let cli = Cli::try_parse_from([
            "screenshot-triage",
            "config",
            "--set",
            "ocr_timeout_secs=20",
            "--set",
            "analyzer=keyword",
        ])
        .unwrap();
        match cli.command {
            Commands::Config { show, set } => {
                assert!(!show);
                assert_eq!(set.len(), 2);
            }
            _ => panic!("unexpected command"),
        }
    }
}
