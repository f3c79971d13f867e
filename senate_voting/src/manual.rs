/*!

This is the long-form manual for `senate_voting` and `senatetally`.

## Inputs

Two tables are needed for an election:
* the **roster** of the students, with at least an identifier column (`CWID`) and a
  `Major` column
* the **ballots**, as exported by the survey tool

Both can be provided as `csv` files (the header being the first row) or as Excel
`xlsx` files (the first worksheet is used unless `excelWorksheetName` is set).

### Ballots

The survey asks one nominee question per school. Most survey tools export questions
that share the same title as de-duplicated columns: the first one keeps the title,
the following ones get a `.1`, `.2`, `.3` suffix:

```text
Campus Wide ID (CWID),Select your nominees,Select your nominees.1,Select your nominees.2,Select your nominees.3
10001,"Alice, Bob",,,
10002,,"Carl",,
```

The title of the question (`Select your nominees` above) is the `candidateColumnName`
option. By default, the four columns belong to `ses`, `sob`, `sse` and `hass`, in this
order. This can be changed with `nomineeColumnOrder`.

A ballot is expected to fill exactly one of the nominee columns. The candidates in a
column are separated by `", "` (option `candidateDelimiter`).

## Counting

Every ballot falls into exactly one of four categories:

| category       | condition                                                            | audit log |
|----------------|----------------------------------------------------------------------|-----------|
| `invalid`      | no nominee column is filled                                          | yes       |
| `wrong_school` | the nominees or the voter (through the major) are of another school | no        |
| `duplicate`    | the voter already has an accepted ballot                             | yes       |
| `valid`        | everything else                                                      | no        |

Voters who are not in the roster, or whose major is not in the directory of majors,
are counted as `wrong_school`. Only the first accepted ballot of a voter is kept.

> Note: the `valid` counter counts the candidates selected on the accepted ballots,
> not the ballots themselves. A ballot naming three candidates adds three to it.

## Seats

Candidates are sorted by number of votes and grouped when they have the same count.
Starting from the highest count, a group is elected as a whole if it fits in the open
seats. The first group that does not fit is reported as a tie for the remaining seats:
the election office must separate these candidates by other means. If there are fewer
candidates than seats, everyone is elected and the rest of the seats stay open.

## Configuration

The configuration is a JSON file (`config.json` by default):

```json
{
  "school": "ses",
  "numSeats": 3,
  "dataFile": "data.csv",
  "candidateColumnName": "Select your nominees"
}
```

Optional fields:
 - `votingFile` (string): the ballots. If not provided, the directory of the configuration
   must contain exactly one `csv` (or `xlsx`) file besides the roster.
 - `voterIdColumnName` (string, default `Campus Wide ID (CWID)`)
 - `rosterIdColumnName` (string, default `CWID`)
 - `rosterMajorColumnName` (string, default `Major`)
 - `nomineeColumnOrder` (array of school codes, default `["ses", "sob", "sse", "hass"]`)
 - `candidateDelimiter` (string, default `", "`)
 - `majorsFile` (string): a JSON file replacing the built-in directory of majors,
   for example `{"ses": ["physics"], "sob": ["finance"], "sse": [], "hass": []}`
 - `auditLog` (string): where to write the invalid and duplicate ballots. The default is
   `InvalidAndDuplicateVotes_<MM-DD-YYYY>.log` next to the configuration.
 - `excelWorksheetName` (string): for Excel inputs, the worksheet to read.

`numSeats` accepts a number or a string holding a number. All the options can be
overridden on the command line.

 */
