//! Initial database migration.
//!
//! Creates all enums and tables for the ledger and the recurring scheduler.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY & CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(ENTRY_COUNTERS_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 4: RECURRING SCHEDULER
        // ============================================================
        db.execute_unprepared(RECURRING_DEFINITIONS_SQL).await?;
        db.execute_unprepared(RECURRING_LINES_SQL).await?;
        db.execute_unprepared(RECURRING_HISTORY_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account classification
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Journal entry lifecycle
CREATE TYPE entry_status AS ENUM ('draft', 'posted', 'void');

-- Journal entry origin
CREATE TYPE entry_source AS ENUM ('manual', 'recurring');

-- Fiscal period status
CREATE TYPE fiscal_period_status AS ENUM ('open', 'closed');

-- Recurring frequency
CREATE TYPE recurring_frequency AS ENUM (
    'daily',
    'weekly',
    'monthly',
    'quarterly',
    'annual'
);

-- Template line side
CREATE TYPE line_side AS ENUM ('debit', 'credit');

-- Recurring execution outcome
CREATE TYPE recurring_run_status AS ENUM ('success', 'failed');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    is_header BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_accounts_company_code UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_period_status NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_period_range CHECK (start_date <= end_date)
);

CREATE INDEX idx_fiscal_periods_company_dates
    ON fiscal_periods(company_id, start_date, end_date);
";

const ENTRY_COUNTERS_SQL: &str = r"
CREATE TABLE entry_counters (
    company_id UUID PRIMARY KEY REFERENCES companies(id) ON DELETE CASCADE,
    next_number BIGINT NOT NULL DEFAULT 1
);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    entry_number BIGINT,
    entry_date DATE NOT NULL,
    description TEXT NOT NULL,
    status entry_status NOT NULL DEFAULT 'draft',
    source entry_source NOT NULL DEFAULT 'manual',
    recurring_definition_id UUID,
    reverses_entry_id UUID REFERENCES journal_entries(id),
    reversed_by_entry_id UUID REFERENCES journal_entries(id),
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- Posted and void entries always carry a number; drafts never do.
    CONSTRAINT chk_entry_number_status CHECK (
        (status = 'draft' AND entry_number IS NULL)
        OR (status <> 'draft' AND entry_number IS NOT NULL)
    )
);

CREATE UNIQUE INDEX uq_journal_entries_company_number
    ON journal_entries(company_id, entry_number)
    WHERE entry_number IS NOT NULL;
CREATE INDEX idx_journal_entries_company_date ON journal_entries(company_id, entry_date);
CREATE INDEX idx_journal_entries_recurring
    ON journal_entries(recurring_definition_id)
    WHERE recurring_definition_id IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    line_order INTEGER NOT NULL,
    debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(9, 6),
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- Exactly one side carries a positive amount.
    CONSTRAINT chk_line_one_side CHECK (
        (debit > 0 AND credit = 0) OR (credit > 0 AND debit = 0)
    )
);

CREATE INDEX idx_journal_lines_entry ON journal_lines(entry_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const RECURRING_DEFINITIONS_SQL: &str = r"
CREATE TABLE recurring_definitions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    frequency recurring_frequency NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE,
    next_execution_date DATE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    auto_posting BOOLEAN NOT NULL DEFAULT true,
    execution_count BIGINT NOT NULL DEFAULT 0,
    success_count BIGINT NOT NULL DEFAULT 0,
    failure_count BIGINT NOT NULL DEFAULT 0,
    claimed_until TIMESTAMPTZ,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_recurring_definitions_company_code UNIQUE (company_id, code)
);

CREATE INDEX idx_recurring_definitions_due
    ON recurring_definitions(next_execution_date)
    WHERE is_active = true;
";

const RECURRING_LINES_SQL: &str = r"
CREATE TABLE recurring_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    definition_id UUID NOT NULL REFERENCES recurring_definitions(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    line_order INTEGER NOT NULL,
    side line_side NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    tax_rate_id UUID,
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_recurring_line_amount CHECK (amount > 0)
);

CREATE INDEX idx_recurring_lines_definition ON recurring_lines(definition_id);
";

const RECURRING_HISTORY_SQL: &str = r"
CREATE TABLE recurring_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    definition_id UUID NOT NULL REFERENCES recurring_definitions(id) ON DELETE CASCADE,
    scheduled_date DATE NOT NULL,
    executed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    status recurring_run_status NOT NULL,
    entry_id UUID REFERENCES journal_entries(id),
    error_message TEXT,

    -- At most one run per definition per occurrence date.
    CONSTRAINT uq_recurring_history_occurrence UNIQUE (definition_id, scheduled_date)
);

CREATE INDEX idx_recurring_history_definition ON recurring_history(definition_id, executed_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS recurring_history CASCADE;
DROP TABLE IF EXISTS recurring_lines CASCADE;
DROP TABLE IF EXISTS recurring_definitions CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS entry_counters CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

DROP TYPE IF EXISTS recurring_run_status;
DROP TYPE IF EXISTS line_side;
DROP TYPE IF EXISTS recurring_frequency;
DROP TYPE IF EXISTS fiscal_period_status;
DROP TYPE IF EXISTS entry_source;
DROP TYPE IF EXISTS entry_status;
DROP TYPE IF EXISTS account_type;
";
